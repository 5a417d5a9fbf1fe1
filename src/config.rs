use std::path::PathBuf;

use anyhow::{Result, anyhow};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Origin of the HTTP API, without a trailing slash.
    pub base_url: String,
    pub ws_url: String,
    pub settings_path: PathBuf,
    /// Workspace folder active when the session starts ("" is the root).
    pub workspace_subdir: String,
}

impl ClientConfig {
    pub fn new(base_url: &str, settings_path: PathBuf) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let ws_url = derive_ws_url(&base_url)?;
        Ok(Self {
            base_url,
            ws_url,
            settings_path,
            workspace_subdir: String::new(),
        })
    }

    pub fn with_ws_url(mut self, ws_url: Option<String>) -> Self {
        if let Some(url) = ws_url {
            self.ws_url = url;
        }
        self
    }

    pub fn with_workspace_subdir(mut self, subdir: Option<String>) -> Self {
        if let Some(subdir) = subdir {
            self.workspace_subdir = subdir;
        }
        self
    }

    pub fn default_settings_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("agentdesk").join("settings.json"))
    }
}

pub fn derive_ws_url(base_url: &str) -> Result<String> {
    let base = base_url.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("https://") {
        return Ok(format!("wss://{}/ws", rest));
    }
    if let Some(rest) = base.strip_prefix("http://") {
        return Ok(format!("ws://{}/ws", rest));
    }
    Err(anyhow!(
        "base url must start with http:// or https:// (got {})",
        base_url
    ))
}

#[cfg(test)]
#[path = "tests/config/ws_url_tests.rs"]
mod tests;
