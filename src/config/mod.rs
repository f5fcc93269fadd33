mod file_config;

pub use file_config::{FileConfig, RemoteConfig};

use crate::local_cache::SqliteStorage;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_PROFILE_DIR: &str = ".jobboard";
pub const DEFAULT_CROSS_TAB_POLL_MS: u64 = 500;
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_REMOTE_POLL_MS: u64 = 2000;
pub const DEFAULT_REMOTE_TIMEOUT_SEC: u64 = 10;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub profile_dir: Option<PathBuf>,
    pub cross_tab_poll_ms: Option<u64>,
    pub remote_project_id: Option<String>,
    pub remote_api_key: Option<String>,
    pub remote_base_url: Option<String>,
    pub sync_counters: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub profile_dir: PathBuf,
    pub cross_tab_poll_interval: Duration,

    /// `None` runs on the local cache only.
    pub remote: Option<RemoteSettings>,
}

/// Settings for the remote mirror. Not validated here: a malformed remote
/// config makes initialization fail, which leaves the tab local-only.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSettings {
    pub project_id: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub sync_counters: bool,
}

impl RemoteSettings {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            base_url: DEFAULT_FIRESTORE_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_REMOTE_POLL_MS),
            timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SEC),
            sync_counters: false,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let profile_dir = file
            .profile_dir
            .map(PathBuf::from)
            .or_else(|| cli.profile_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROFILE_DIR));
        if profile_dir.exists() && !profile_dir.is_dir() {
            bail!("profile_dir is not a directory: {:?}", profile_dir);
        }

        let cross_tab_poll_ms = file
            .cross_tab_poll_ms
            .or(cli.cross_tab_poll_ms)
            .unwrap_or(DEFAULT_CROSS_TAB_POLL_MS);
        if cross_tab_poll_ms == 0 {
            bail!("cross_tab_poll_ms must be greater than 0");
        }

        let remote = resolve_remote(cli, file.remote);

        Ok(Self {
            profile_dir,
            cross_tab_poll_interval: Duration::from_millis(cross_tab_poll_ms),
            remote,
        })
    }

    pub fn storage_db_path(&self) -> PathBuf {
        self.profile_dir.join(SqliteStorage::FILE_NAME)
    }

    pub fn sync_counters(&self) -> bool {
        self.remote
            .as_ref()
            .map(|remote| remote.sync_counters)
            .unwrap_or(false)
    }
}

fn resolve_remote(cli: &CliConfig, file: Option<RemoteConfig>) -> Option<RemoteSettings> {
    if file.is_none() && cli.remote_project_id.is_none() {
        return None;
    }
    if cfg!(feature = "no_remote") {
        warn!("Built with no_remote, ignoring the remote configuration");
        return None;
    }

    let file = file.unwrap_or_default();
    let project_id = file
        .project_id
        .or_else(|| cli.remote_project_id.clone())
        .unwrap_or_default();

    let mut settings = RemoteSettings::new(project_id);
    settings.api_key = file.api_key.or_else(|| cli.remote_api_key.clone());
    if let Some(base_url) = file.base_url.or_else(|| cli.remote_base_url.clone()) {
        settings.base_url = base_url;
    }
    if let Some(poll_interval_ms) = file.poll_interval_ms {
        settings.poll_interval = Duration::from_millis(poll_interval_ms);
    }
    if let Some(timeout_sec) = file.timeout_sec {
        settings.timeout = Duration::from_secs(timeout_sec);
    }
    settings.sync_counters = file.sync_counters.unwrap_or(cli.sync_counters);
    Some(settings)
}
