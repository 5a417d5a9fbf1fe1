//! Wire events. Outbound events are `{action, args}` objects; inbound frames
//! are classified by their tag, and tags this client does not know are kept
//! as `Unknown` so the caller can skip them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::settings::Settings;
use crate::state::AgentStatus;

/// Agent actions whose `message` is shown in the transcript.
const AGENT_ACTIONS: &[&str] = &[
    "run", "kill", "read", "write", "browse", "think", "message", "recall",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub action: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ChatEvent {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            args: Map::new(),
        }
    }

    pub fn with_arg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.args.insert(key.to_string(), value.into());
        self
    }

    /// Starts a task on the agent.
    pub fn start(task: &str) -> Self {
        Self::new("start").with_arg("task", task)
    }

    /// Asks the backend to (re)build its agent from `settings`.
    pub fn initialize(settings: &Settings) -> Self {
        Self::new("initialize")
            .with_arg("model", settings.llm_model.as_str())
            .with_arg("agent_cls", settings.agent.as_str())
            .with_arg("language", settings.language.as_str())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InboundEvent {
    Initialized {
        message: Option<String>,
    },
    AgentStateChanged(AgentStatus),
    Finished {
        message: Option<String>,
    },
    AgentAction {
        action: String,
        message: String,
    },
    Observation {
        observation: String,
        content: String,
    },
    Error {
        message: String,
    },
    ServerMessage {
        message: String,
    },
    Unknown {
        tag: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame is not JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
}

impl InboundEvent {
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let v: Value = serde_json::from_str(text)?;
        let obj = v.as_object().ok_or(DecodeError::NotAnObject)?;
        Ok(Self::from_object(obj))
    }

    fn from_object(obj: &Map<String, Value>) -> Self {
        let message = str_field(obj, "message");

        if obj.get("error").and_then(Value::as_bool).unwrap_or(false) {
            return InboundEvent::Error {
                message: message.unwrap_or_else(|| "Unknown error".to_string()),
            };
        }

        if let Some(action) = obj.get("action").and_then(Value::as_str) {
            let args = obj.get("args").and_then(Value::as_object);
            return match action {
                "initialize" => InboundEvent::Initialized { message },
                "change_agent_state" => match args.and_then(|a| str_field(a, "agent_state")) {
                    Some(s) => InboundEvent::AgentStateChanged(AgentStatus::from_wire(&s)),
                    None => InboundEvent::Unknown {
                        tag: action.to_string(),
                    },
                },
                "finish" => InboundEvent::Finished { message },
                a if AGENT_ACTIONS.contains(&a) => InboundEvent::AgentAction {
                    action: a.to_string(),
                    message: message
                        .filter(|m| !m.is_empty())
                        .or_else(|| args.and_then(|x| str_field(x, "content")))
                        .or_else(|| args.and_then(|x| str_field(x, "thought")))
                        .unwrap_or_default(),
                },
                other => InboundEvent::Unknown {
                    tag: other.to_string(),
                },
            };
        }

        if let Some(observation) = obj.get("observation").and_then(Value::as_str) {
            let content = str_field(obj, "content")
                .filter(|c| !c.is_empty())
                .or(message)
                .unwrap_or_default();
            return InboundEvent::Observation {
                observation: observation.to_string(),
                content,
            };
        }

        match message {
            Some(message) => InboundEvent::ServerMessage { message },
            None => InboundEvent::Unknown {
                tag: "<untagged>".to_string(),
            },
        }
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
#[path = "../tests/transport/event_tests.rs"]
mod tests;
