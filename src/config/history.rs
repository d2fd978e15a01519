use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::MATCH_NUMBER_KEY;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Entry whose value labels new history records
    #[serde(default = "default_match_number_key")]
    pub match_number_key: String,

    /// Maximum records kept per entry (0 means unlimited)
    #[serde(default)]
    pub max_records: usize,

    /// Directory for persisted history lists. Kept in memory when unset.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            match_number_key: default_match_number_key(),
            max_records: 0,
            storage_dir: None,
        }
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.match_number_key.starts_with('/') {
            return Err(Error::Config(ConfigError::Message(format!(
                "history.match_number_key must be a fully-qualified key, got {:?}",
                self.match_number_key
            ))));
        }

        if let Some(dir) = &self.storage_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::Config(ConfigError::Message(
                    "history.storage_dir cannot be empty".into(),
                )));
            }
        }

        Ok(())
    }
}

fn default_match_number_key() -> String {
    MATCH_NUMBER_KEY.to_string()
}
