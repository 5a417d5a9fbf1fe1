//! Local read-through view of the remote workspace.
//!
//! The tree is never patched locally: every change (refresh, upload) ends in
//! a fresh listing from the server, which replaces the stored tree wholesale.
//! Responses are ordered by the moment their listing request was issued; a
//! listing issued earlier than one already applied for the same folder is
//! dropped.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::error::ClientResult;
use crate::model::{OpenedFile, UploadFile, WorkspaceNode, normalize, qualify_path};
use crate::remote::WorkspaceClient;
use crate::state::{Action, AppState, Notification};

const NOTIFY_SOURCE: &str = "workspace";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeJobKind {
    Refresh,
    Upload { files: usize },
}

/// Completion of a refresh or upload job, ready to be committed.
#[derive(Debug)]
pub struct TreeOutcome {
    pub subdir: String,
    pub kind: TreeJobKind,
    /// Issue sequence of the listing request; `None` when the job failed
    /// before a listing was requested.
    pub sequence: Option<u64>,
    pub result: ClientResult<WorkspaceNode>,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub path: String,
    pub sequence: u64,
    pub result: ClientResult<String>,
}

#[derive(Debug)]
pub enum WorkspaceOutcome {
    Tree(TreeOutcome),
    File(FileOutcome),
}

pub struct WorkspaceTreeModel {
    client: WorkspaceClient,
    sequence: Arc<AtomicU64>,
    applied: HashMap<String, u64>,
    applied_file: Option<u64>,
}

impl WorkspaceTreeModel {
    pub fn new(client: WorkspaceClient) -> Self {
        Self {
            client,
            sequence: Arc::new(AtomicU64::new(0)),
            applied: HashMap::new(),
            applied_file: None,
        }
    }

    /// Future that lists `subdir`. It owns everything it needs, so several can
    /// be in flight while the model keeps committing results.
    pub fn refresh_job(&self, subdir: &str) -> impl Future<Output = TreeOutcome> + Send + 'static {
        let client = self.client.clone();
        let sequence = self.sequence.clone();
        let subdir = subdir.to_string();
        async move {
            let (seq, result) = fetch_normalized(&client, &sequence, &subdir).await;
            TreeOutcome {
                subdir,
                kind: TreeJobKind::Refresh,
                sequence: Some(seq),
                result,
            }
        }
    }

    /// Upload followed by a re-list of the same folder. The folder is fixed
    /// when the job is created, whatever the active folder is by the time the
    /// upload finishes.
    pub fn upload_job(
        &self,
        subdir: &str,
        files: Vec<UploadFile>,
    ) -> impl Future<Output = TreeOutcome> + Send + 'static {
        let client = self.client.clone();
        let sequence = self.sequence.clone();
        let subdir = subdir.to_string();
        async move {
            let kind = TreeJobKind::Upload { files: files.len() };
            if let Err(err) = client.upload_files(&subdir, &files).await {
                return TreeOutcome {
                    subdir,
                    kind,
                    sequence: None,
                    result: Err(err),
                };
            }
            let (seq, result) = fetch_normalized(&client, &sequence, &subdir).await;
            TreeOutcome {
                subdir,
                kind,
                sequence: Some(seq),
                result,
            }
        }
    }

    /// Future that loads `path` (relative to `subdir`) for viewing.
    pub fn open_job(
        &self,
        subdir: &str,
        path: &str,
    ) -> impl Future<Output = FileOutcome> + Send + 'static {
        let client = self.client.clone();
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let path = qualify_path(subdir, path);
        async move {
            let result = client.select_file(&path).await;
            FileOutcome {
                path,
                sequence: seq,
                result,
            }
        }
    }

    /// Applies a finished tree job. Returns `Ok(true)` when the stored tree
    /// was replaced and `Ok(false)` when the result was stale. Failures leave
    /// the stored tree untouched and are reported as notifications.
    pub fn commit_tree(&mut self, state: &mut AppState, outcome: TreeOutcome) -> ClientResult<bool> {
        let TreeOutcome {
            subdir,
            kind,
            sequence,
            result,
        } = outcome;

        let stale = sequence.is_some_and(|seq| self.is_stale(&subdir, seq));
        match result {
            Ok(root) => {
                let Some(seq) = sequence else {
                    return Ok(false);
                };
                if stale {
                    debug!(subdir = %subdir, seq, "discarding stale workspace listing");
                    return Ok(false);
                }
                self.applied.insert(subdir.clone(), seq);
                if let TreeJobKind::Upload { files } = kind {
                    info!(subdir = %subdir, files, "upload complete");
                }
                state.apply(Action::ReplaceWorkspaceTree { subdir, root });
                Ok(true)
            }
            Err(err) => {
                // A superseded refresh has nothing to tell the user; a failed
                // upload always does.
                if stale && kind == TreeJobKind::Refresh {
                    debug!(subdir = %subdir, error = %err, "ignoring failure of superseded refresh");
                    return Ok(false);
                }
                let prefix = match kind {
                    TreeJobKind::Refresh => "Error refreshing workspace",
                    TreeJobKind::Upload { .. } => "Error uploading file",
                };
                state.apply(Action::Notify(Notification::error(
                    NOTIFY_SOURCE,
                    format!("{}: {}", prefix, err.user_message()),
                )));
                Err(err)
            }
        }
    }

    pub fn commit_file(&mut self, state: &mut AppState, outcome: FileOutcome) -> ClientResult<bool> {
        let FileOutcome {
            path,
            sequence,
            result,
        } = outcome;
        match result {
            Ok(code) => {
                if self.applied_file.is_some_and(|s| s > sequence) {
                    debug!(path = %path, "discarding stale file content");
                    return Ok(false);
                }
                self.applied_file = Some(sequence);
                state.apply(Action::OpenFile(OpenedFile { path, code }));
                Ok(true)
            }
            Err(err) => {
                state.apply(Action::Notify(Notification::error(
                    NOTIFY_SOURCE,
                    format!("Error opening {}: {}", path, err.user_message()),
                )));
                Err(err)
            }
        }
    }

    pub fn commit(&mut self, state: &mut AppState, outcome: WorkspaceOutcome) -> ClientResult<bool> {
        match outcome {
            WorkspaceOutcome::Tree(t) => self.commit_tree(state, t),
            WorkspaceOutcome::File(f) => self.commit_file(state, f),
        }
    }

    /// Lists the active folder and commits the result.
    pub async fn refresh(&mut self, state: &mut AppState) -> ClientResult<bool> {
        let outcome = self.refresh_job(state.workspace_folder()).await;
        self.commit_tree(state, outcome)
    }

    /// Uploads into the active folder, then re-lists it.
    pub async fn upload_and_refresh(
        &mut self,
        state: &mut AppState,
        files: Vec<UploadFile>,
    ) -> ClientResult<bool> {
        let outcome = self.upload_job(state.workspace_folder(), files).await;
        self.commit_tree(state, outcome)
    }

    /// Opens `path`, relative to the active folder, for viewing.
    pub async fn open_file(&mut self, state: &mut AppState, path: &str) -> ClientResult<bool> {
        let outcome = self.open_job(state.workspace_folder(), path).await;
        self.commit_file(state, outcome)
    }

    fn is_stale(&self, subdir: &str, seq: u64) -> bool {
        self.applied.get(subdir).is_some_and(|applied| *applied > seq)
    }
}

async fn fetch_normalized(
    client: &WorkspaceClient,
    sequence: &AtomicU64,
    subdir: &str,
) -> (u64, ClientResult<WorkspaceNode>) {
    let seq = sequence.fetch_add(1, Ordering::SeqCst);
    let result = client.fetch_tree(subdir).await.map(normalize);
    (seq, result)
}

impl From<TreeOutcome> for WorkspaceOutcome {
    fn from(t: TreeOutcome) -> Self {
        WorkspaceOutcome::Tree(t)
    }
}

impl From<FileOutcome> for WorkspaceOutcome {
    fn from(f: FileOutcome) -> Self {
        WorkspaceOutcome::File(f)
    }
}

#[cfg(test)]
#[path = "tests/workspace/commit_tests.rs"]
mod tests;
