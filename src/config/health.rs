use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_STALE_AFTER_IN_MS;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthConfig {
    /// The feed counts as stale once no frame has been parsed for longer than
    /// this (unit: milliseconds)
    #[serde(default = "default_stale_after")]
    pub stale_after_in_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            stale_after_in_ms: default_stale_after(),
        }
    }
}

impl HealthConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_in_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stale_after_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "health.stale_after_in_ms must be greater than 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_stale_after() -> u64 {
    DEFAULT_STALE_AFTER_IN_MS
}
