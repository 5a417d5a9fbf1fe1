//! The single source of truth read by presentation.
//!
//! `AppState` is only changed through [`AppState::apply`]; every applied
//! [`Action`] bumps [`AppState::revision`] so a renderer can tell when to redraw.

use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::model::{OpenedFile, WorkspaceNode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent,
    Observation,
    System,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: String,
    /// Protocol tag that produced the entry (`run`, `think`, ...), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Uninitialized,
    Initialized,
    Running,
    Paused,
    Stopped,
    Finished,
    Error,
    Other(String),
}

impl AgentStatus {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "init" | "initialized" => AgentStatus::Initialized,
            "running" => AgentStatus::Running,
            "paused" => AgentStatus::Paused,
            "stopped" => AgentStatus::Stopped,
            "finished" => AgentStatus::Finished,
            "error" => AgentStatus::Error,
            other => AgentStatus::Other(other.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Terminal: an unrecoverable protocol error was seen.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    /// Which part of the client raised it: "ws", "workspace", "settings", ...
    pub source: String,
    pub message: String,
}

impl Notification {
    pub fn error(source: &str, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            source: source.to_string(),
            message: message.into(),
        }
    }

    pub fn info(source: &str, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            source: source.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    AppendUserMessage(String),
    AppendAgentMessage { tag: Option<String>, content: String },
    AppendObservation { tag: String, content: String },
    AppendSystemMessage(String),
    AgentInitialized,
    SetAgentStatus(AgentStatus),
    SetWorkspaceFolder(String),
    ReplaceWorkspaceTree { subdir: String, root: WorkspaceNode },
    OpenFile(OpenedFile),
    Notify(Notification),
    SetConnection(ConnectionState),
}

#[derive(Clone, Debug)]
pub struct AppState {
    revision: u64,
    messages: Vec<ChatMessage>,
    workspace_folder: String,
    trees: BTreeMap<String, WorkspaceNode>,
    opened_file: Option<OpenedFile>,
    agent_status: AgentStatus,
    connection: ConnectionState,
    notifications: Vec<Notification>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new("")
    }
}

impl AppState {
    pub fn new(workspace_folder: &str) -> Self {
        Self {
            revision: 0,
            messages: Vec::new(),
            workspace_folder: workspace_folder.to_string(),
            trees: BTreeMap::new(),
            opened_file: None,
            agent_status: AgentStatus::Uninitialized,
            connection: ConnectionState::Disconnected,
            notifications: Vec::new(),
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::AppendUserMessage(content) => self.push_message(Sender::User, None, content),
            Action::AppendAgentMessage { tag, content } => {
                self.push_message(Sender::Agent, tag, content)
            }
            Action::AppendObservation { tag, content } => {
                self.push_message(Sender::Observation, Some(tag), content)
            }
            Action::AppendSystemMessage(content) => {
                self.push_message(Sender::System, None, content)
            }
            Action::AgentInitialized => self.agent_status = AgentStatus::Initialized,
            Action::SetAgentStatus(status) => self.agent_status = status,
            Action::SetWorkspaceFolder(folder) => self.workspace_folder = folder,
            Action::ReplaceWorkspaceTree { subdir, root } => {
                self.trees.insert(subdir, root);
            }
            Action::OpenFile(file) => self.opened_file = Some(file),
            Action::Notify(n) => self.notifications.push(n),
            Action::SetConnection(c) => self.connection = c,
        }
        self.revision += 1;
    }

    fn push_message(&mut self, sender: Sender, tag: Option<String>, content: String) {
        let at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        self.messages.push(ChatMessage {
            sender,
            content,
            tag,
            at,
        });
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn workspace_folder(&self) -> &str {
        &self.workspace_folder
    }

    /// Last tree committed for `subdir`.
    pub fn tree(&self, subdir: &str) -> Option<&WorkspaceNode> {
        self.trees.get(subdir)
    }

    /// Tree of the active workspace folder.
    pub fn active_tree(&self) -> Option<&WorkspaceNode> {
        self.tree(&self.workspace_folder)
    }

    pub fn opened_file(&self) -> Option<&OpenedFile> {
        self.opened_file.as_ref()
    }

    pub fn agent_status(&self) -> &AgentStatus {
        &self.agent_status
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Hands pending notifications to the renderer.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        if self.notifications.is_empty() {
            return Vec::new();
        }
        self.revision += 1;
        std::mem::take(&mut self.notifications)
    }
}

#[cfg(test)]
#[path = "tests/state/app_state_tests.rs"]
mod tests;
