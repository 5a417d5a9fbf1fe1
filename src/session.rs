//! Owner of all client state.
//!
//! A `Session` holds the application state and the three components allowed
//! to change it. Network work runs on spawned tasks, but every result is
//! applied here, one at a time.

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::model::UploadFile;
use crate::remote::WorkspaceClient;
use crate::settings::{RawSettings, Settings, SettingsPatch, SettingsStore, requires_reinitialize};
use crate::state::{Action, AppState, Notification};
use crate::store::{FileStore, KeyValueStore};
use crate::transport::ChatTransport;
use crate::workspace::{WorkspaceOutcome, WorkspaceTreeModel};

/// Something the user asked for, delivered to [`Session::run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    SendMessage(String),
    Refresh,
    SetFolder(String),
    Upload(Vec<UploadFile>),
    Open(String),
    ApplySettings(RawSettings),
    Quit,
}

/// What a single [`Session::step`] applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    Transport,
    Workspace { changed: bool },
}

pub struct Session<S = FileStore> {
    config: ClientConfig,
    state: AppState,
    settings: SettingsStore<S>,
    workspace: WorkspaceTreeModel,
    transport: ChatTransport,
    jobs: JoinSet<WorkspaceOutcome>,
}

impl Session<FileStore> {
    /// Session backed by the settings file named in `config`.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let store = FileStore::open(config.settings_path.clone());
        Self::with_store(config, store)
    }
}

impl<S: KeyValueStore> Session<S> {
    pub fn with_store(config: ClientConfig, store: S) -> ClientResult<Self> {
        let client = WorkspaceClient::new(&config.base_url)?;
        Ok(Self {
            state: AppState::new(&config.workspace_subdir),
            settings: SettingsStore::new(store),
            workspace: WorkspaceTreeModel::new(client),
            transport: ChatTransport::new(&config.ws_url),
            jobs: JoinSet::new(),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn settings(&self) -> Settings {
        self.settings.current()
    }

    pub fn transport(&self) -> &ChatTransport {
        &self.transport
    }

    /// Workspace jobs still in flight.
    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Connects the chat channel, asks the backend to build an agent from the
    /// current settings and lists the active folder.
    pub async fn start(&mut self) -> ClientResult<()> {
        self.refresh();
        self.transport.connect(&mut self.state).await?;
        let settings = self.settings.current();
        self.transport.send_initialize(&mut self.state, &settings)
    }

    pub fn close(&mut self) {
        self.transport.close(&mut self.state);
        self.jobs.abort_all();
    }

    pub fn send_message(&mut self, text: &str) -> ClientResult<()> {
        self.transport.send_user_message(&mut self.state, text)
    }

    /// Starts a listing of the active folder.
    pub fn refresh(&mut self) {
        let job = self.workspace.refresh_job(self.state.workspace_folder());
        self.jobs.spawn(async move { WorkspaceOutcome::from(job.await) });
    }

    /// Starts an upload into the active folder, followed by a re-list.
    pub fn upload(&mut self, files: Vec<UploadFile>) {
        let job = self
            .workspace
            .upload_job(self.state.workspace_folder(), files);
        self.jobs.spawn(async move { WorkspaceOutcome::from(job.await) });
    }

    /// Starts loading `path`, relative to the active folder.
    pub fn open(&mut self, path: &str) {
        let job = self.workspace.open_job(self.state.workspace_folder(), path);
        self.jobs.spawn(async move { WorkspaceOutcome::from(job.await) });
    }

    /// Switches the active folder and lists it.
    pub fn set_folder(&mut self, folder: &str) {
        self.state
            .apply(Action::SetWorkspaceFolder(folder.to_string()));
        self.refresh();
    }

    /// Saves `raw` and returns what changed. The backend is re-initialized
    /// when the model or the agent changed and the channel is open.
    pub fn apply_settings(&mut self, raw: &RawSettings) -> ClientResult<SettingsPatch> {
        let patch = self.settings.pending_changes(raw);
        if let Err(err) = self.settings.save(raw) {
            self.state.apply(Action::Notify(Notification::error(
                "settings",
                format!("Error saving settings: {}", err.user_message()),
            )));
            return Err(err);
        }
        if requires_reinitialize(&patch) {
            if self.transport.is_connected() {
                let settings = self.settings.current();
                self.transport.send_initialize(&mut self.state, &settings)?;
            } else {
                debug!("settings changed while disconnected; initialize deferred to next start");
            }
        }
        Ok(patch)
    }

    /// Waits for the next transport event or finished workspace job and
    /// applies it. Pending forever when neither can arrive.
    pub async fn step(&mut self) -> Progress {
        tokio::select! {
            Some(event) = self.transport.next_event() => {
                self.transport.apply(&mut self.state, event);
                Progress::Transport
            }
            Some(joined) = self.jobs.join_next(), if !self.jobs.is_empty() => {
                Progress::Workspace { changed: self.commit_joined(joined) }
            }
        }
    }

    /// Applies workspace jobs until none are left. Transport events arriving
    /// meanwhile stay queued in order.
    pub async fn settle(&mut self) {
        while let Some(joined) = self.jobs.join_next().await {
            self.commit_joined(joined);
        }
    }

    /// Drives the session until `Quit` or until the intent channel closes.
    /// `observe` sees the state after every change.
    pub async fn run(
        &mut self,
        mut intents: mpsc::UnboundedReceiver<Intent>,
        mut observe: impl FnMut(&mut AppState),
    ) {
        loop {
            tokio::select! {
                intent = intents.recv() => {
                    match intent {
                        None | Some(Intent::Quit) => break,
                        Some(intent) => self.handle(intent),
                    }
                }
                _ = self.step() => {}
            }
            observe(&mut self.state);
        }
        info!("session loop finished");
    }

    fn handle(&mut self, intent: Intent) {
        let result = match intent {
            Intent::SendMessage(text) => self.send_message(&text),
            Intent::Refresh => {
                self.refresh();
                Ok(())
            }
            Intent::SetFolder(folder) => {
                self.set_folder(&folder);
                Ok(())
            }
            Intent::Upload(files) => {
                self.upload(files);
                Ok(())
            }
            Intent::Open(path) => {
                self.open(&path);
                Ok(())
            }
            Intent::ApplySettings(raw) => self.apply_settings(&raw).map(|_| ()),
            Intent::Quit => Ok(()),
        };
        // Failures were already turned into notifications.
        if let Err(err) = result {
            debug!(error = %err, "intent failed");
        }
    }

    fn commit_joined(&mut self, joined: Result<WorkspaceOutcome, tokio::task::JoinError>) -> bool {
        match joined {
            Ok(outcome) => self
                .workspace
                .commit(&mut self.state, outcome)
                .unwrap_or(false),
            Err(err) if err.is_cancelled() => false,
            Err(err) => {
                warn!(error = %err, "workspace job panicked");
                let err = ClientError::request_failed(format!("workspace job failed: {}", err));
                self.state
                    .apply(Action::Notify(Notification::error("workspace", err.user_message())));
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session/session_tests.rs"]
mod tests;
