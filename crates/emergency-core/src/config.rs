//! Session configuration
//!
//! Defaults, optionally overridden by a JSON file; the CLI applies its own
//! flags on top.

use crate::dispatch::ChannelKind;
use crate::EmergencyError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the JSON collections and audit logs
    pub logs_dir: PathBuf,
    /// Number shown when dialing and in the manual fallback message
    pub emergency_number: String,
    /// Token that counts as "yes" at every confirmation gate
    pub affirmative: String,
    /// Alert delivery variant
    pub channel: ChannelKind,
    /// Interval between connection dots; `None` uses the channel default
    pub connect_interval_ms: Option<u64>,
    /// Locations containing this text get the regional health-center list
    pub region_keyword: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
            emergency_number: "112".to_string(),
            affirmative: "S".to_string(),
            channel: ChannelKind::Standard,
            connect_interval_ms: None,
            region_keyword: "murcia".to_string(),
        }
    }
}

impl Config {
    /// Load a config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, EmergencyError> {
        let text = fs::read_to_string(path)
            .map_err(|e| EmergencyError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&text)
            .map_err(|e| EmergencyError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EmergencyError> {
        if self.affirmative.trim().is_empty() {
            return Err(EmergencyError::Config("affirmative token must not be empty".into()));
        }
        if self.emergency_number.trim().is_empty() {
            return Err(EmergencyError::Config("emergency number must not be empty".into()));
        }
        Ok(())
    }
}
