//! Socket pumps. The reader and writer only move frames between the
//! websocket and channels; all decoding and state changes happen on the
//! transport owner.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, warn};

use super::TransportEvent;
use crate::error::{ClientError, ClientResult};

pub(super) struct SocketTasks {
    pub(super) outbound: mpsc::UnboundedSender<Message>,
    pub(super) reader: JoinHandle<()>,
    pub(super) writer: JoinHandle<()>,
}

pub(super) async fn open(
    url: &str,
    conn: u64,
    events: mpsc::UnboundedSender<TransportEvent>,
) -> ClientResult<SocketTasks> {
    let (ws, _resp) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| ClientError::Connect(format!("{}: {}", url, e)))?;
    let (mut sink, mut stream) = ws.split();

    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    let writer_events = events.clone();
    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(err) = sink.send(msg).await {
                warn!(conn, error = %err, "websocket write failed");
                let _ = writer_events.send(lifecycle_event(conn, &err));
                return;
            }
        }
        // Sender dropped: the owner closed the transport.
        let _ = sink.send(Message::Close(None)).await;
        let _ = sink.close().await;
        debug!(conn, "websocket writer finished");
    });

    let reader = tokio::spawn(async move {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if events.send(TransportEvent::Frame { conn, text }).is_err() {
                        return;
                    }
                }
                Ok(Message::Close(frame)) => {
                    let reason = frame.map(|f| f.reason.to_string()).filter(|r| !r.is_empty());
                    let _ = events.send(TransportEvent::Closed { conn, reason });
                    return;
                }
                Ok(Message::Binary(bytes)) => {
                    debug!(conn, len = bytes.len(), "ignoring binary frame");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(conn, error = %err, "websocket read failed");
                    let _ = events.send(lifecycle_event(conn, &err));
                    return;
                }
            }
        }
        let _ = events.send(TransportEvent::Closed { conn, reason: None });
    });

    Ok(SocketTasks {
        outbound,
        reader,
        writer,
    })
}

/// Protocol violations are unrecoverable; anything else is an ordinary
/// disconnect.
fn lifecycle_event(conn: u64, err: &tungstenite::Error) -> TransportEvent {
    match err {
        tungstenite::Error::Protocol(_)
        | tungstenite::Error::Utf8
        | tungstenite::Error::Capacity(_) => TransportEvent::Failed {
            conn,
            reason: err.to_string(),
        },
        _ => TransportEvent::Closed {
            conn,
            reason: Some(err.to_string()),
        },
    }
}
