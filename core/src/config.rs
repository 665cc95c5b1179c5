//! Runtime configuration, loaded from environment variables with a
//! config-file fallback.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database file.
    pub storage_path: PathBuf,
    /// Destination for `timeclock-cli export`; `None` falls through to
    /// the caller's working directory (the USB-discovery heuristic
    /// that would normally decide this is out of scope here).
    pub export_path: Option<PathBuf>,
    /// Debounce window for duplicate scans, in milliseconds.
    pub debounce_ms: u64,
    /// Expiry for the "last clocked employee" AppState slot, in seconds.
    pub last_clocked_expiry_secs: u64,
    /// Expiry for a pending-identification handle, in seconds.
    pub pending_identification_expiry_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            export_path: None,
            debounce_ms: 1_200,
            last_clocked_expiry_secs: 120,
            pending_identification_expiry_secs: 30,
        }
    }
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timeclock")
        .join("timeclock.db")
}

fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timeclock")
        .join("config.json")
}

impl AppConfig {
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_file() {
            return config;
        }

        let mut config = Self::default();

        if let Ok(path) = env::var("TIME_CLOCK_STORAGE_PATH") {
            config.storage_path = PathBuf::from(path);
        }

        if let Ok(path) = env::var("TIME_CLOCK_EXPORT_PATH") {
            config.export_path = Some(PathBuf::from(path));
        }

        if let Ok(v) = env::var("TIME_CLOCK_DEBOUNCE_MS") {
            if let Ok(parsed) = v.parse() {
                config.debounce_ms = parsed;
            }
        }

        if let Ok(v) = env::var("TIME_CLOCK_LAST_CLOCKED_EXPIRY_SECS") {
            if let Ok(parsed) = v.parse() {
                config.last_clocked_expiry_secs = parsed;
            }
        }

        if let Ok(v) = env::var("TIME_CLOCK_PENDING_ID_EXPIRY_SECS") {
            if let Ok(parsed) = v.parse() {
                config.pending_identification_expiry_secs = parsed;
            }
        }

        config
    }

    fn load_from_file() -> Option<Self> {
        let path = config_file_path();
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn save(&self) -> std::io::Result<()> {
        let path = config_file_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }
}
