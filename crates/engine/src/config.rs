//! Runtime configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::types::TICK_MS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Logic tick period in milliseconds
    pub tick_ms: u32,
    pub settings_path: PathBuf,
    pub log_path: Option<PathBuf>,
    /// Level to open instead of the remembered one
    pub start_level: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            settings_path: default_settings_path(),
            log_path: None,
            start_level: None,
        }
    }
}

fn default_settings_path() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".bombz").join("settings.txt")
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .and_then(|s| if s.is_empty() { None } else { Some(s) })
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let tick_ms = non_empty("BOMBZ_TICK_MS")
            .and_then(|s| s.parse().ok())
            .filter(|&ms| ms > 0)
            .unwrap_or(TICK_MS);

        let settings_path = non_empty("BOMBZ_SETTINGS")
            .map(PathBuf::from)
            .unwrap_or_else(default_settings_path);

        let log_path = non_empty("BOMBZ_LOG_PATH").map(PathBuf::from);

        let start_level = non_empty("BOMBZ_START_LEVEL").and_then(|s| s.parse().ok());

        Self {
            tick_ms,
            settings_path,
            log_path,
            start_level,
        }
    }
}
