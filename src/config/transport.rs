use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_BRIDGE_URL;
use crate::constants::DEFAULT_RECONNECT_DELAY_IN_MS;
use crate::Error;
use crate::Result;

/// Bridge connection parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransportConfig {
    /// WebSocket URL of the bridge process
    #[serde(default = "default_url")]
    pub url: String,

    /// Fixed delay before each reconnect attempt (unit: milliseconds)
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_in_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect_delay_in_ms: default_reconnect_delay(),
        }
    }
}

impl TransportConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_in_ms)
    }

    /// Validates transport configuration
    /// # Errors
    /// Returns `Error::Config` when:
    /// - the URL is not a `ws://` or `wss://` URL
    /// - the reconnect delay is 0
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(Error::Config(ConfigError::Message(format!(
                "transport.url must be a ws:// or wss:// URL, got {:?}",
                self.url
            ))));
        }

        // A zero delay would turn a refused connection into a busy loop
        if self.reconnect_delay_in_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "transport.reconnect_delay_in_ms must be greater than 0".into(),
            )));
        }

        Ok(())
    }
}

fn default_url() -> String {
    DEFAULT_BRIDGE_URL.to_string()
}

fn default_reconnect_delay() -> u64 {
    DEFAULT_RECONNECT_DELAY_IN_MS
}
