//! Desk configuration.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! `~/.agentdesk/config.json`, and `AGENTDESK_*` environment variables.
//!
//! # Example
//!
//! ```ignore
//! use agentdesk::config::DeskConfig;
//!
//! let config = DeskConfig::default()
//!     .with_api_base_url("https://desk.example.com")
//!     .with_enrich_statuses(true);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{DeskError, DeskResult};

/// Config directory under the home directory.
const CONFIG_DIR: &str = ".agentdesk";

const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REFRESH_SECS: u64 = 30;
pub const DEFAULT_TOAST_AUTO_HIDE_MS: u64 = 5000;
pub const DEFAULT_MAX_THREADS_PER_PAGE: usize = 50;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_BASE_URL: &str = "AGENTDESK_API_BASE_URL";
pub const ENV_WORK_ITEMS_URL: &str = "AGENTDESK_WORK_ITEMS_URL";
pub const ENV_TEAMS_USER_ID: &str = "AGENTDESK_TEAMS_USER_ID";
pub const ENV_REFRESH_SECS: &str = "AGENTDESK_REFRESH_SECS";
pub const ENV_ENRICH_STATUSES: &str = "AGENTDESK_ENRICH_STATUSES";

/// Runtime settings of the desk.
#[derive(Debug, Clone, PartialEq)]
pub struct DeskConfig {
    /// Desk backend base URL (identity endpoints)
    pub api_base_url: String,
    /// Work-item store base URL (default: `api_base_url`)
    pub work_items_url: Option<String>,
    /// Teams user the agent signs in as
    pub teams_user_id: Option<String>,
    /// Period of the background thread refresh
    pub refresh_interval: Duration,
    /// How long the resolved notice stays up
    pub toast_auto_hide: Duration,
    /// Page size of the thread listing
    pub max_threads_per_page: usize,
    /// Apply externally-driven statuses from the work-item store after each fetch
    pub enrich_statuses: bool,
    pub request_timeout: Duration,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            work_items_url: None,
            teams_user_id: None,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            toast_auto_hide: Duration::from_millis(DEFAULT_TOAST_AUTO_HIDE_MS),
            max_threads_per_page: DEFAULT_MAX_THREADS_PER_PAGE,
            enrich_statuses: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// On-disk form of [`DeskConfig`]; every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeskConfigFile {
    pub api_base_url: Option<String>,
    pub work_items_url: Option<String>,
    pub teams_user_id: Option<String>,
    pub refresh_secs: Option<u64>,
    pub toast_auto_hide_ms: Option<u64>,
    pub max_threads_per_page: Option<usize>,
    pub enrich_statuses: Option<bool>,
    pub request_timeout_secs: Option<u64>,
}

impl DeskConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_work_items_url(mut self, url: impl Into<String>) -> Self {
        self.work_items_url = Some(url.into());
        self
    }

    pub fn with_teams_user_id(mut self, id: impl Into<String>) -> Self {
        self.teams_user_id = Some(id.into());
        self
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_toast_auto_hide(mut self, delay: Duration) -> Self {
        self.toast_auto_hide = delay;
        self
    }

    pub fn with_max_threads_per_page(mut self, max: usize) -> Self {
        self.max_threads_per_page = max;
        self
    }

    pub fn with_enrich_statuses(mut self, enrich: bool) -> Self {
        self.enrich_statuses = enrich;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Base URL of the work-item store.
    pub fn work_items_base_url(&self) -> &str {
        self.work_items_url.as_deref().unwrap_or(&self.api_base_url)
    }

    /// Path of the config file (`~/.agentdesk/config.json`).
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn default_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Defaults overridden by the `AGENTDESK_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// Defaults, then the config file if present, then the environment.
    pub fn load() -> DeskResult<Self> {
        let base = match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path)?,
            _ => Self::default(),
        };
        Ok(base.apply_env())
    }

    /// Defaults overridden by the values of a JSON config file.
    pub fn load_from_file(path: &Path) -> DeskResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeskError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let file: DeskConfigFile = serde_json::from_str(&content).map_err(|e| {
            DeskError::Config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(Self::default().apply_file(file))
    }

    fn apply_file(mut self, file: DeskConfigFile) -> Self {
        if let Some(url) = file.api_base_url {
            self.api_base_url = url;
        }
        if file.work_items_url.is_some() {
            self.work_items_url = file.work_items_url;
        }
        if file.teams_user_id.is_some() {
            self.teams_user_id = file.teams_user_id;
        }
        if let Some(secs) = file.refresh_secs {
            self.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = file.toast_auto_hide_ms {
            self.toast_auto_hide = Duration::from_millis(ms);
        }
        if let Some(max) = file.max_threads_per_page {
            self.max_threads_per_page = max;
        }
        if let Some(enrich) = file.enrich_statuses {
            self.enrich_statuses = enrich;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        self
    }

    fn apply_env(mut self) -> Self {
        if let Some(url) = non_empty_env(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(url) = non_empty_env(ENV_WORK_ITEMS_URL) {
            self.work_items_url = Some(url);
        }
        if let Some(id) = non_empty_env(ENV_TEAMS_USER_ID) {
            self.teams_user_id = Some(id);
        }
        if let Some(raw) = non_empty_env(ENV_REFRESH_SECS) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => self.refresh_interval = Duration::from_secs(secs),
                _ => tracing::warn!("Ignoring invalid {}={}", ENV_REFRESH_SECS, raw),
            }
        }
        if let Some(raw) = non_empty_env(ENV_ENRICH_STATUSES) {
            match parse_flag(&raw) {
                Some(flag) => self.enrich_statuses = flag,
                None => tracing::warn!("Ignoring invalid {}={}", ENV_ENRICH_STATUSES, raw),
            }
        }
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for key in [
            ENV_API_BASE_URL,
            ENV_WORK_ITEMS_URL,
            ENV_TEAMS_USER_ID,
            ENV_REFRESH_SECS,
            ENV_ENRICH_STATUSES,
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_defaults() {
        let config = DeskConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.toast_auto_hide, Duration::from_millis(5000));
        assert_eq!(config.max_threads_per_page, 50);
        assert!(!config.enrich_statuses);
        assert_eq!(config.work_items_base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_builder() {
        let config = DeskConfig::new()
            .with_api_base_url("https://desk.example.com")
            .with_work_items_url("https://items.example.com")
            .with_teams_user_id("aad-1")
            .with_refresh_interval(Duration::from_secs(5))
            .with_enrich_statuses(true);

        assert_eq!(config.work_items_base_url(), "https://items.example.com");
        assert_eq!(config.teams_user_id.as_deref(), Some("aad-1"));
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert!(config.enrich_statuses);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var(ENV_API_BASE_URL, "https://desk.example.com");
        std::env::set_var(ENV_TEAMS_USER_ID, "aad-1");
        std::env::set_var(ENV_REFRESH_SECS, "10");
        std::env::set_var(ENV_ENRICH_STATUSES, "true");

        let config = DeskConfig::from_env();
        clear_env();

        assert_eq!(config.api_base_url, "https://desk.example.com");
        assert_eq!(config.teams_user_id.as_deref(), Some("aad-1"));
        assert_eq!(config.refresh_interval, Duration::from_secs(10));
        assert!(config.enrich_statuses);
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_invalid_values() {
        clear_env();
        std::env::set_var(ENV_REFRESH_SECS, "soon");
        std::env::set_var(ENV_ENRICH_STATUSES, "maybe");
        std::env::set_var(ENV_API_BASE_URL, "  ");

        let config = DeskConfig::from_env();
        clear_env();

        assert_eq!(config, DeskConfig::default());
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_zero_refresh() {
        clear_env();
        std::env::set_var(ENV_REFRESH_SECS, "0");
        let config = DeskConfig::from_env();
        clear_env();
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api_base_url": "https://desk.example.com", "refresh_secs": 15, "toast_auto_hide_ms": 2000}}"#
        )
        .unwrap();

        let config = DeskConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.api_base_url, "https://desk.example.com");
        assert_eq!(config.refresh_interval, Duration::from_secs(15));
        assert_eq!(config.toast_auto_hide, Duration::from_millis(2000));
        assert_eq!(config.max_threads_per_page, 50);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = DeskConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, DeskError::Config(_)));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DeskConfig::load_from_file(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.error_code(), "E_CONFIG");
    }

    #[test]
    fn test_default_path() {
        if let Some(path) = DeskConfig::default_path() {
            assert!(path.ends_with(".agentdesk/config.json"));
        }
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" Off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
