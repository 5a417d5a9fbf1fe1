//! Websocket endpoint backed by a stand-in agent that echoes tasks back.

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};

use super::*;

const NOT_STARTED: &str = "No agent started. Please wait a second...";

pub(super) async fn ws_route(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(handle_socket)
}

async fn handle_socket(socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let mut agent = EchoAgent::default();
    info!("chat client connected");

    while let Some(incoming) = receiver.next().await {
        let text = match incoming {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(data)) => match String::from_utf8(data) {
                Ok(text) => text,
                Err(_) => continue,
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Err(err) => {
                warn!(error = %err, "websocket receive failed");
                break;
            }
        };

        for reply in agent.handle_frame(&text) {
            if sender.send(Message::Text(reply.to_string())).await.is_err() {
                debug!("chat client went away mid-reply");
                return;
            }
        }
    }
    info!("chat client disconnected");
}

/// Per-connection agent. It must be initialized before it accepts tasks.
#[derive(Debug, Default)]
pub(super) struct EchoAgent {
    initialized: bool,
}

impl EchoAgent {
    /// Frames to send back for one inbound text frame, in order.
    pub(super) fn handle_frame(&mut self, text: &str) -> Vec<Value> {
        let data: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(_) => return vec![error_frame("Invalid JSON")],
        };
        let Some(action) = data.get("action").and_then(Value::as_str) else {
            return vec![error_frame("Invalid event")];
        };
        let args = data.get("args").cloned().unwrap_or(Value::Null);

        match action {
            "initialize" => {
                self.initialized = true;
                debug!(args = %args, "agent initialized");
                vec![json!({"action": "initialize", "message": "Control loop started."})]
            }
            "start" => self.start(&args),
            _ if !self.initialized => vec![error_frame(NOT_STARTED)],
            "chat" => Vec::new(),
            other => vec![error_frame(&format!(
                "I didn't recognize this action:{}",
                other
            ))],
        }
    }

    fn start(&self, args: &Value) -> Vec<Value> {
        let Some(task) = args.get("task").and_then(Value::as_str) else {
            return vec![error_frame("No task specified")];
        };
        let mut out = vec![json!({"message": "Starting new task..."})];
        if !self.initialized {
            out.push(error_frame(NOT_STARTED));
            return out;
        }
        out.push(json!({
            "action": "change_agent_state",
            "args": {"agent_state": "running"},
            "message": "",
        }));
        out.push(json!({
            "action": "message",
            "args": {"content": task},
            "message": format!("You said: {}", task),
        }));
        out.push(json!({
            "action": "finish",
            "args": {},
            "message": "All done.",
        }));
        out
    }
}

fn error_frame(message: &str) -> Value {
    json!({"error": true, "message": message})
}

#[cfg(test)]
#[path = "../../tests/bin/agentdesk_server/echo_agent_tests.rs"]
mod tests;
