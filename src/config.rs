use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_CONFIG_PATH: &str = "config/txunajob.json";

const ENV_API_BASE: &str = "TXUNAJOB_API_BASE";
const ENV_WS_URL: &str = "TXUNAJOB_WS_URL";
const ENV_DB_PATH: &str = "TXUNAJOB_DB_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the REST API, without trailing slash.
    pub api_base: String,
    /// Origin of the Socket.IO server.
    pub ws_url: String,
    /// SQLite file holding the persisted session.
    pub db_path: String,
    pub request_timeout_secs: u64,
    pub refresh_interval_secs: u64,
    pub notification_ttl_secs: u64,
    /// Bound of the channel event queue; oldest events are dropped beyond it.
    pub event_queue_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000/api".to_string(),
            ws_url: "http://localhost:5000".to_string(),
            db_path: "data/client.db".to_string(),
            request_timeout_secs: 10,
            refresh_interval_secs: 30,
            notification_ttl_secs: 5,
            event_queue_capacity: 100,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Never zero: a zero period cannot drive an interval timer.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    /// Environment variables win over the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var(ENV_API_BASE) {
            self.api_base = value;
        }
        if let Ok(value) = env::var(ENV_WS_URL) {
            self.ws_url = value;
        }
        if let Ok(value) = env::var(ENV_DB_PATH) {
            self.db_path = value;
        }
        self.api_base = self.api_base.trim_end_matches('/').to_string();
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    let mut config = match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    };
    config.apply_env_overrides();
    config
}

/// Writes `config` as pretty JSON, creating parent directories. An existing
/// file is only replaced when `overwrite` is set; returns whether it wrote.
pub fn save_config(path: impl AsRef<Path>, config: &AppConfig, overwrite: bool) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() && !overwrite {
        log::warn!("Config file {} already exists; left untouched", path.display());
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(config)?)?;
    log::info!("Wrote config file {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{"request_timeout_secs": 3}"#).unwrap();

        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.refresh_interval_secs, 30);
        assert_eq!(config.event_queue_capacity, 100);
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, "not json").unwrap();

        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/cfg.json");
        let path = path.to_str().unwrap();

        let config = AppConfig {
            refresh_interval_secs: 60,
            ..AppConfig::default()
        };
        assert!(save_config(path, &config, false).unwrap());
        assert_eq!(load_config(path).refresh_interval_secs, 60);

        assert!(!save_config(path, &AppConfig::default(), false).unwrap());
        assert_eq!(load_config(path).refresh_interval_secs, 60);
        assert!(save_config(path, &AppConfig::default(), true).unwrap());
        assert_eq!(load_config(path).refresh_interval_secs, 30);
    }

    #[test]
    fn zero_refresh_interval_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{"refresh_interval_secs": 0}"#).unwrap();

        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }
}
