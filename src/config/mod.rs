//! Configuration management for the telemetry mirror.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
//! - Component-wise validation
mod health;
mod history;
mod logging;
mod transport;
pub use health::*;
pub use history::*;
pub use logging::*;
pub use transport::*;


use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Prefix of environment variables that override configuration values,
/// e.g. `NT__TRANSPORT__URL`.
const ENV_PREFIX: &str = "NT";

/// Main configuration container for the mirror components
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct MirrorConfig {
    /// Bridge connection parameters
    #[serde(default)]
    pub transport: TransportConfig,
    /// Feed staleness reporting
    #[serde(default)]
    pub health: HealthConfig,
    /// Value history ledger
    #[serde(default)]
    pub history: HistoryConfig,
    /// Log output of the binary
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Debug for MirrorConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("MirrorConfig")
            .field("transport", &self.transport)
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}

impl MirrorConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Sources are merged in order (later sources override earlier):
    /// 1. Type defaults
    /// 2. Configuration file from `CONFIG_PATH` (if set)
    /// 3. Environment variables with `NT__` prefix
    ///
    /// # Note
    /// Validation is deferred so callers can apply `with_override_config()`
    /// first. Call `validate()` before using the result.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("NT__TRANSPORT__URL", "ws://10.0.0.2:13102");
    /// let cfg = MirrorConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional overrides from a file without validation.
    ///
    /// Merging order: current values, then the file, then the environment.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.transport.validate()?;
        self.health.validate()?;
        self.history.validate()?;
        self.logging.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
