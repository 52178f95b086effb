use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DATA_DIR_NAME, DEFAULT_API_URL, DEFAULT_DEBOUNCE_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
    PREFERENCES_FILE,
};

/// Session configuration, loadable from a camelCase JSON file or the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    pub api_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Where preferences.json lives
    pub data_dir: PathBuf,

    pub request_timeout_secs: u64,

    pub debounce_ms: u64,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(api_url: impl Into<String>, data_dir: P) -> Self {
        Self {
            api_url: api_url.into(),
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Load config from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: CoreConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Defaults overridden by `ANNOTATOR_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `ANNOTATOR_API_URL`, `ANNOTATOR_API_KEY`, `ANNOTATOR_DATA_DIR`,
    /// `ANNOTATOR_TIMEOUT_SECS` and `ANNOTATOR_DEBOUNCE_MS` from `lookup`.
    /// Unparseable numbers are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ANNOTATOR_API_URL") {
            self.api_url = url;
        }
        if let Some(key) = lookup("ANNOTATOR_API_KEY").filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(dir) = lookup("ANNOTATOR_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("ANNOTATOR_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.request_timeout_secs = secs;
        }
        if let Some(ms) = lookup("ANNOTATOR_DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
            self.debounce_ms = ms;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            data_dir: default_data_dir(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("annotator_data"))
}
