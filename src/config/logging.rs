use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Write logs into this directory instead of stdout
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            file_name: default_file_name(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.log_dir.is_some() && self.file_name.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "logging.file_name cannot be empty when log_dir is set".into(),
            )));
        }
        Ok(())
    }
}

fn default_file_name() -> String {
    "nt-mirror.log".to_string()
}
