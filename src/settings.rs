//! User-configurable options, layered as compiled-in defaults plus durable
//! overrides.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::ClientResult;
use crate::store::{FileStore, KeyValueStore};

/// Settings as they arrive from a form or the command line: any key, any value.
pub type RawSettings = BTreeMap<String, String>;

/// Recognized options only.
pub type SettingsPatch = BTreeMap<SettingKey, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SettingKey {
    #[serde(rename = "LLM_MODEL")]
    LlmModel,
    #[serde(rename = "AGENT")]
    Agent,
    #[serde(rename = "LANGUAGE")]
    Language,
}

impl SettingKey {
    pub const ALL: [SettingKey; 3] = [SettingKey::LlmModel, SettingKey::Agent, SettingKey::Language];

    /// Storage key, also used on the wire and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::LlmModel => "LLM_MODEL",
            SettingKey::Agent => "AGENT",
            SettingKey::Language => "LANGUAGE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn default_value(&self) -> &'static str {
        match self {
            SettingKey::LlmModel => "gpt-3.5-turbo",
            SettingKey::Agent => "MonologueAgent",
            SettingKey::Language => "en",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Settings {
    #[serde(rename = "LLM_MODEL")]
    pub llm_model: String,
    #[serde(rename = "AGENT")]
    pub agent: String,
    #[serde(rename = "LANGUAGE")]
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_model: SettingKey::LlmModel.default_value().to_string(),
            agent: SettingKey::Agent.default_value().to_string(),
            language: SettingKey::Language.default_value().to_string(),
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> &str {
        match key {
            SettingKey::LlmModel => &self.llm_model,
            SettingKey::Agent => &self.agent,
            SettingKey::Language => &self.language,
        }
    }

    fn slot(&mut self, key: SettingKey) -> &mut String {
        match key {
            SettingKey::LlmModel => &mut self.llm_model,
            SettingKey::Agent => &mut self.agent,
            SettingKey::Language => &mut self.language,
        }
    }
}

pub struct SettingsStore<S = FileStore> {
    store: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Defaults merged with whatever overrides are stored. An empty stored
    /// value counts as unset.
    pub fn current(&self) -> Settings {
        let mut out = Settings::default();
        for key in SettingKey::ALL {
            if let Some(v) = self.store.get(key.as_str())
                && !v.is_empty()
            {
                *out.slot(key) = v;
            }
        }
        out
    }

    /// Persists every recognized, non-empty entry of `partial`. Unknown keys
    /// and empty values are dropped.
    pub fn save(&mut self, partial: &RawSettings) -> ClientResult<()> {
        for (key, value) in partial {
            let Some(k) = SettingKey::parse(key) else {
                debug!(key = %key, "dropping unrecognized setting");
                continue;
            };
            if value.is_empty() {
                debug!(key = %k, "dropping empty setting value");
                continue;
            }
            self.store.set(k.as_str(), value)?;
            info!(key = %k, value = %value, "setting saved");
        }
        Ok(())
    }

    /// Recognized entries of `candidate` whose value differs from the current
    /// effective value.
    pub fn diff(&self, candidate: &RawSettings) -> SettingsPatch {
        let current = self.current();
        candidate
            .iter()
            .filter_map(|(key, value)| {
                let k = SettingKey::parse(key)?;
                (current.get(k) != value.as_str()).then(|| (k, value.clone()))
            })
            .collect()
    }

    /// The part of `diff` that `save` would actually persist. Empty values
    /// are never stored, so they are never a change.
    pub fn pending_changes(&self, candidate: &RawSettings) -> SettingsPatch {
        let mut patch = self.diff(candidate);
        patch.retain(|_, value| !value.is_empty());
        patch
    }
}

/// Changing the model or the agent requires the backend to rebuild its agent.
pub fn requires_reinitialize(diff: &SettingsPatch) -> bool {
    diff.contains_key(&SettingKey::LlmModel) || diff.contains_key(&SettingKey::Agent)
}

/// Parses `KEY=VALUE` pairs as typed on the command line.
pub fn parse_assignments<'a>(
    pairs: impl IntoIterator<Item = &'a str>,
) -> anyhow::Result<RawSettings> {
    let mut out = RawSettings::new();
    for pair in pairs {
        let (k, v) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("expected KEY=VALUE, got {}", pair))?;
        out.insert(k.trim().to_string(), v.trim().to_string());
    }
    Ok(out)
}

#[cfg(test)]
#[path = "tests/settings/settings_store_tests.rs"]
mod tests;
