//! Journal configuration
//!
//! File locations and server settings, read once at startup from the
//! environment (and `.env` via dotenvy) and handed to the store and router.

use std::path::PathBuf;
use tracing::{info, warn};

const DEFAULT_TRADE_LOG_PATH: &str = "trade_log.csv";
const DEFAULT_SCREENSHOT_DIR: &str = "screenshots";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// CSV trade log
    pub trade_log_path: PathBuf,
    /// Directory for uploaded screenshots
    pub screenshot_dir: PathBuf,
    pub port: u16,
    /// Request body limit for screenshot uploads
    pub max_upload_bytes: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            trade_log_path: PathBuf::from(DEFAULT_TRADE_LOG_PATH),
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl JournalConfig {
    /// Read `TRADE_LOG_PATH`, `SCREENSHOT_DIR`, `PORT` and `MAX_UPLOAD_BYTES`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            trade_log_path: lookup("TRADE_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.trade_log_path),
            screenshot_dir: lookup("SCREENSHOT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.screenshot_dir),
            port: parse_or_default(&lookup, "PORT", defaults.port),
            max_upload_bytes: parse_or_default(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        };

        info!(
            "JournalConfig loaded: trade_log={}, screenshots={}, port={}",
            config.trade_log_path.display(),
            config.screenshot_dir.display(),
            config.port
        );
        config
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {}='{}', using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = JournalConfig::from_lookup(|_| None);
        assert_eq!(config.trade_log_path, PathBuf::from("trade_log.csv"));
        assert_eq!(config.screenshot_dir, PathBuf::from("screenshots"));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("TRADE_LOG_PATH", "/data/journal.csv"),
            ("SCREENSHOT_DIR", "/data/shots"),
            ("PORT", "9100"),
        ]
        .into_iter()
        .collect();
        let config = JournalConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.trade_log_path, PathBuf::from("/data/journal.csv"));
        assert_eq!(config.screenshot_dir, PathBuf::from("/data/shots"));
        assert_eq!(config.port, 9100);
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = JournalConfig::from_lookup(|k| (k == "PORT").then(|| "http".to_string()));
        assert_eq!(config.port, 8000);
    }
}
