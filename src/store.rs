//! Durable flat key/value storage backing the settings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> ClientResult<()>;
}

/// Keys live in a single JSON object file, rewritten atomically on every set.
/// Only string values are visible through `get`; everything else in the file
/// is carried through rewrites as it was.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl FileStore {
    /// Opens the store at `path`. A missing or unreadable file reads as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %path.display(), error = %format!("{:#}", err), "ignoring unreadable settings file");
                Map::new()
            }
        };
        Self { path, entries }
    }
}

fn read_entries(path: &Path) -> anyhow::Result<Map<String, Value>> {
    if !path.exists() {
        debug!(path = %path.display(), "settings file not found; using defaults");
        return Ok(Map::new());
    }
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let v: Value =
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))?;
    match v {
        Value::Object(obj) => Ok(obj),
        _ => anyhow::bail!("{} is not a JSON object", path.display()),
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn set(&mut self, key: &str, value: &str) -> ClientResult<()> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), Value::String(value.to_string()));
        let bytes = serde_json::to_vec_pretty(&next)
            .map_err(|e| ClientError::Storage(format!("serialize settings: {}", e)))?;
        write_atomic(&self.path, &bytes).map_err(|e| ClientError::Storage(format!("{:#}", e)))?;
        self.entries = next;
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> ClientResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/store/file_store_tests.rs"]
mod tests;
