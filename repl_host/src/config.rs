//! Host configuration.
//!
//! Loaded from an optional JSON file, then overridden by command-line flags.
//! Missing fields take their defaults.

use crate::runtime::HostError;
use life_game::LifeConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Host runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Milliseconds per game frame
    pub tick_ms: u64,
    /// Milliseconds the host's own idle behavior sleeps per empty poll
    pub idle_backoff_ms: u64,
    /// Prompt printed before each line
    pub prompt: String,
    /// Maximum input polls before returning (0 = unlimited)
    pub max_polls: usize,
    /// Whether console output is echoed to stdout
    pub echo: bool,
    /// Game parameters
    pub life: LifeConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            idle_backoff_ms: 1,
            prompt: "> ".to_string(),
            max_polls: 0,
            echo: true,
            life: LifeConfig::default(),
        }
    }
}

impl HostConfig {
    /// Loads a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses a configuration from JSON text
    ///
    /// Rejects game boards too large to allocate.
    pub fn from_json(text: &str) -> Result<Self, HostError> {
        let config: Self = serde_json::from_str(text)?;
        config.life.validate()?;
        Ok(config)
    }

    /// Frame interval
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Host idle sleep per empty poll
    pub fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }
}
