use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub profile_dir: Option<String>,
    pub cross_tab_poll_ms: Option<u64>,

    // Presence of this table turns remote sync on
    pub remote: Option<RemoteConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RemoteConfig {
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    /// Points at the Firestore emulator when set.
    pub base_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub timeout_sec: Option<u64>,
    pub sync_counters: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
