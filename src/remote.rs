//! HTTP client for the workspace endpoints.

use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::model::{UploadFile, WorkspaceNode};

mod files;
mod http_client;
mod types;
pub use self::types::*;

#[derive(Clone)]
pub struct WorkspaceClient {
    base_url: String,
    client: reqwest::Client,
}

impl WorkspaceClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("agentdesk")
            .build()
            .map_err(|e| ClientError::request_failed(format!("build http client: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}
