//! The chat transport: one persistent websocket per session.
//!
//! Frames arrive on a channel and are applied by the owner one at a time, in
//! the order the socket delivered them. Sending while not connected fails
//! immediately; nothing is queued.

use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::settings::Settings;
use crate::state::{Action, AgentStatus, AppState, ConnectionState, Notification};

mod event;
mod socket;
pub use self::event::*;

const NOTIFY_SOURCE: &str = "ws";

/// What the socket pumps report back. `conn` identifies the connection the
/// event belongs to, so late events from a closed socket are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    Frame { conn: u64, text: String },
    Closed { conn: u64, reason: Option<String> },
    Failed { conn: u64, reason: String },
}

impl TransportEvent {
    fn conn(&self) -> u64 {
        match self {
            TransportEvent::Frame { conn, .. }
            | TransportEvent::Closed { conn, .. }
            | TransportEvent::Failed { conn, .. } => *conn,
        }
    }
}

pub struct ChatTransport {
    url: String,
    state: ConnectionState,
    conn: u64,
    tasks: Option<socket::SocketTasks>,
    events_tx: mpsc::UnboundedSender<TransportEvent>,
    events_rx: mpsc::UnboundedReceiver<TransportEvent>,
}

impl ChatTransport {
    pub fn new(url: &str) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            url: url.to_string(),
            state: ConnectionState::Disconnected,
            conn: 0,
            tasks: None,
            events_tx,
            events_rx,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Opens the socket. A no-op when already connected; refused once the
    /// transport has failed.
    pub async fn connect(&mut self, app: &mut AppState) -> ClientResult<()> {
        match self.state {
            ConnectionState::Connected => return Ok(()),
            ConnectionState::Failed => {
                return Err(ClientError::Connect(
                    "transport failed earlier; start a new session".to_string(),
                ));
            }
            ConnectionState::Connecting | ConnectionState::Disconnected => {}
        }

        self.conn += 1;
        self.set_state(app, ConnectionState::Connecting);
        match socket::open(&self.url, self.conn, self.events_tx.clone()).await {
            Ok(tasks) => {
                self.tasks = Some(tasks);
                self.set_state(app, ConnectionState::Connected);
                info!(url = %self.url, conn = self.conn, "transport connected");
                Ok(())
            }
            Err(err) => {
                self.set_state(app, ConnectionState::Disconnected);
                app.apply(Action::Notify(Notification::error(
                    NOTIFY_SOURCE,
                    err.user_message(),
                )));
                Err(err)
            }
        }
    }

    /// Closes the socket. Events still buffered for it are ignored.
    pub fn close(&mut self, app: &mut AppState) {
        self.retire();
        if self.state != ConnectionState::Failed {
            self.set_state(app, ConnectionState::Disconnected);
        }
        debug!(url = %self.url, "transport closed");
    }

    /// Stops the current socket tasks and moves to a fresh connection id, so
    /// anything the old reader already queued is dropped by `apply`.
    fn retire(&mut self) {
        if let Some(tasks) = self.tasks.take() {
            // Dropping the sender lets the writer send a close frame and exit.
            drop(tasks.outbound);
            tasks.reader.abort();
            drop(tasks.writer);
        }
        self.conn += 1;
    }

    /// Serializes and hands `event` to the writer. Fire-and-forget: success
    /// means the frame was queued on an open connection.
    pub fn send_event(&self, event: &ChatEvent) -> ClientResult<()> {
        if self.state != ConnectionState::Connected {
            return Err(ClientError::TransportSendFailed(format!(
                "not connected ({:?})",
                self.state
            )));
        }
        let tasks = self
            .tasks
            .as_ref()
            .ok_or_else(|| ClientError::TransportSendFailed("no open socket".to_string()))?;
        let text = event
            .to_json()
            .map_err(|e| ClientError::TransportSendFailed(format!("encode event: {}", e)))?;
        tasks
            .outbound
            .send(Message::Text(text))
            .map_err(|_| ClientError::TransportSendFailed("socket writer has stopped".to_string()))?;
        debug!(action = %event.action, "event sent");
        Ok(())
    }

    /// Appends `text` to the transcript right away, then sends a `start`
    /// event. The transcript entry stays even if the send fails.
    pub fn send_user_message(&mut self, app: &mut AppState, text: &str) -> ClientResult<()> {
        app.apply(Action::AppendUserMessage(text.to_string()));
        self.send_reporting(app, &ChatEvent::start(text))
    }

    /// Asks the backend to rebuild its agent from `settings`.
    pub fn send_initialize(&mut self, app: &mut AppState, settings: &Settings) -> ClientResult<()> {
        self.send_reporting(app, &ChatEvent::initialize(settings))
    }

    fn send_reporting(&mut self, app: &mut AppState, event: &ChatEvent) -> ClientResult<()> {
        self.send_event(event).inspect_err(|err| {
            warn!(action = %event.action, error = %err, "send failed");
            app.apply(Action::Notify(Notification::error(
                NOTIFY_SOURCE,
                err.user_message(),
            )));
        })
    }

    /// Waits for the next socket event.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events_rx.recv().await
    }

    /// Applies one socket event to `app`. Must be called in receipt order.
    pub fn apply(&mut self, app: &mut AppState, event: TransportEvent) {
        if event.conn() != self.conn {
            debug!(conn = event.conn(), current = self.conn, "dropping event from old connection");
            return;
        }
        match event {
            TransportEvent::Frame { text, .. } => match InboundEvent::decode(&text) {
                Ok(inbound) => dispatch(app, inbound),
                Err(err) => warn!(error = %err, "dropping undecodable frame"),
            },
            TransportEvent::Closed { reason, .. } => {
                self.retire();
                self.set_state(app, ConnectionState::Disconnected);
                let message = match reason {
                    Some(r) => format!("Connection closed: {}", r),
                    None => "Connection closed".to_string(),
                };
                info!(url = %self.url, "{}", message);
                app.apply(Action::Notify(Notification::info(NOTIFY_SOURCE, message)));
            }
            TransportEvent::Failed { reason, .. } => {
                self.retire();
                self.set_state(app, ConnectionState::Failed);
                let err = ClientError::Protocol(reason);
                warn!(url = %self.url, error = %err, "transport failed");
                app.apply(Action::Notify(Notification::error(
                    NOTIFY_SOURCE,
                    err.user_message(),
                )));
            }
        }
    }

    fn set_state(&mut self, app: &mut AppState, next: ConnectionState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "transport state");
        }
        self.state = next;
        app.apply(Action::SetConnection(next));
    }

    #[cfg(test)]
    fn inject(&self, event: TransportEvent) {
        let _ = self.events_tx.send(event);
    }

    #[cfg(test)]
    fn force_state(&mut self, state: ConnectionState) {
        self.state = state;
    }
}

/// Routes a decoded inbound event to the state it changes.
pub fn dispatch(app: &mut AppState, event: InboundEvent) {
    match event {
        InboundEvent::Initialized { message } => {
            app.apply(Action::AgentInitialized);
            app.apply(Action::AppendSystemMessage(
                message.unwrap_or_else(|| "Agent initialized.".to_string()),
            ));
        }
        InboundEvent::AgentStateChanged(status) => {
            app.apply(Action::SetAgentStatus(status));
        }
        InboundEvent::Finished { message } => {
            app.apply(Action::SetAgentStatus(AgentStatus::Finished));
            if let Some(m) = message.filter(|m| !m.is_empty()) {
                app.apply(Action::AppendAgentMessage {
                    tag: Some("finish".to_string()),
                    content: m,
                });
            }
        }
        InboundEvent::AgentAction { action, message } => {
            if message.is_empty() {
                debug!(action = %action, "agent action without text");
                return;
            }
            app.apply(Action::AppendAgentMessage {
                tag: Some(action),
                content: message,
            });
        }
        InboundEvent::Observation {
            observation,
            content,
        } => {
            app.apply(Action::AppendObservation {
                tag: observation,
                content,
            });
        }
        InboundEvent::Error { message } => {
            app.apply(Action::Notify(Notification::error(NOTIFY_SOURCE, message)));
        }
        InboundEvent::ServerMessage { message } => {
            app.apply(Action::AppendSystemMessage(message));
        }
        InboundEvent::Unknown { tag } => {
            info!(tag = %tag, "ignoring unrecognized inbound event");
        }
    }
}

#[cfg(test)]
#[path = "tests/transport/transport_tests.rs"]
mod tests;
