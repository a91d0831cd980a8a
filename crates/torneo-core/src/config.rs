//! Application configuration management.
//!
//! Configuration is stored at `~/.config/torneo/config.json`. Every field has
//! a default, so a missing file is not an error. Environment variables (also
//! read from `.env`) override the file:
//!
//! | Variable                 | Field              |
//! |--------------------------|--------------------|
//! | `TORNEO_SUBMIT_URL`      | `submit_url`       |
//! | `TORNEO_COMPETITORS_URL` | `competitors_url`  |
//! | `TORNEO_BIND`            | `bind_addr`        |
//! | `TORNEO_POLL_SECS`       | `poll_interval_secs` |
//! | `TORNEO_SUBMIT_MODE`     | `submit_mode`      |
//! | `TORNEO_LOG_DIR`         | `log_dir`          |

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::event::DEFAULT_START;

/// Application name used for the config directory path
const APP_NAME: &str = "torneo";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Script that appends registration rows to the tournament sheet.
const DEFAULT_SUBMIT_URL: &str = "https://script.google.com/macros/s/AKfycbwVT3il4lOPihQbjsdz1KKMgB_p5ZgiaXhl-15LgkoUX7VfsRJWYgPl_1mnlBFRqUkQ/exec";

/// Script that returns the registered competitor list as a JSON array.
const DEFAULT_COMPETITORS_URL: &str = "https://script.google.com/macros/s/AKfycbwzO9mVCwld76BngT5RhtxkueOn-Wo6eSwbVo7EyAy6FQrADx357iyqoMxxUFj52LcARw/exec";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Competitor list refresh period.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Shortest poll period accepted from configuration.
const MIN_POLL_INTERVAL_SECS: u64 = 5;

/// How a submission's success is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    /// Require a 2xx response and honour a `status` field in the body.
    #[default]
    Confirmed,
    /// Treat any response as success; only transport failures are errors.
    /// Matches browsers posting cross-origin without being able to read the reply.
    FireAndForget,
}

impl std::str::FromStr for SubmitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "confirmed" => Ok(SubmitMode::Confirmed),
            "fire_and_forget" | "no_cors" => Ok(SubmitMode::FireAndForget),
            other => Err(format!("unknown submit mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub submit_url: String,
    pub competitors_url: String,
    pub bind_addr: String,
    pub poll_interval_secs: u64,
    pub submit_mode: SubmitMode,
    pub event_start: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            submit_url: DEFAULT_SUBMIT_URL.to_string(),
            competitors_url: DEFAULT_COMPETITORS_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            submit_mode: SubmitMode::default(),
            event_start: DEFAULT_START.to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides from `lookup` (the process environment in production).
    /// Unparseable values are logged and ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TORNEO_SUBMIT_URL") {
            self.submit_url = url;
        }
        if let Some(url) = lookup("TORNEO_COMPETITORS_URL") {
            self.competitors_url = url;
        }
        if let Some(addr) = lookup("TORNEO_BIND") {
            self.bind_addr = addr;
        }
        if let Some(secs) = lookup("TORNEO_POLL_SECS") {
            match secs.trim().parse() {
                Ok(secs) => self.poll_interval_secs = secs,
                Err(_) => warn!(value = %secs, "Ignoring invalid TORNEO_POLL_SECS"),
            }
        }
        if let Some(mode) = lookup("TORNEO_SUBMIT_MODE") {
            match mode.parse() {
                Ok(mode) => self.submit_mode = mode,
                Err(e) => warn!(error = %e, "Ignoring invalid TORNEO_SUBMIT_MODE"),
            }
        }
        if let Some(dir) = lookup("TORNEO_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }
    }

    /// Poll period, clamped to a floor so a typo cannot hammer the script.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(MIN_POLL_INTERVAL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.submit_mode, SubmitMode::Confirmed);
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut config = Config::default();
        config.submit_mode = SubmitMode::FireAndForget;
        config.poll_interval_secs = 60;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.submit_mode, SubmitMode::FireAndForget);
        assert_eq!(loaded.poll_interval_secs, 60);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"bind_addr": "0.0.0.0:8080"}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.competitors_url, DEFAULT_COMPETITORS_URL);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TORNEO_SUBMIT_URL", "http://localhost:9000/submit"),
            ("TORNEO_POLL_SECS", "1"),
            ("TORNEO_SUBMIT_MODE", "fire-and-forget"),
            ("TORNEO_LOG_DIR", "/tmp/torneo"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.submit_url, "http://localhost:9000/submit");
        assert_eq!(config.submit_mode, SubmitMode::FireAndForget);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/torneo")));
        // clamped to the floor
        assert_eq!(config.poll_interval(), Duration::from_secs(MIN_POLL_INTERVAL_SECS));
    }

    #[test]
    fn test_invalid_env_values_ignored() {
        let mut config = Config::default();
        config.apply_env(|k| match k {
            "TORNEO_POLL_SECS" => Some("soon".to_string()),
            "TORNEO_SUBMIT_MODE" => Some("yolo".to_string()),
            _ => None,
        });
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(config.submit_mode, SubmitMode::Confirmed);
    }
}
