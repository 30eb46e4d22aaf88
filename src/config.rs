//! Configuration loading and validation.
//!
//! Configuration is read from a TOML file; every section and field has a
//! default, so an empty file is a valid configuration.
//!
//! ```toml
//! [optimizer]
//! attempts = 5
//! min_gap = 2
//! seed = 42
//!
//! [service]
//! channel_capacity = 16
//! timeout_ms = 30000
//!
//! [logging]
//! level = "info"
//! format = "pretty"   # or "json"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};
use crate::scheduler::DEFAULT_ATTEMPTS;

/// Main configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Optimizer settings.
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Worker settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Optimizer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Greedy attempts per run.
    pub attempts: usize,
    /// Default gap threshold for new shows.
    pub min_gap: usize,
    /// Seed for the shuffled attempts; OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            min_gap: 2,
            seed: None,
        }
    }
}

/// Optimizer worker settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Capacity of the request channel.
    pub channel_capacity: usize,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl ServiceConfig {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
            timeout_ms: 30_000,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"show_order=debug"`.
    pub level: String,
    pub format: LogFormat,
}

impl LoggingConfig {
    fn filter(&self) -> std::result::Result<EnvFilter, ParseError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level),
        }
    }

    /// Installs the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over `level`. Logs go to stderr so that
    /// reports printed on stdout stay machine-readable.
    pub fn init(&self) -> Result<()> {
        let filter = self.filter().map_err(|e| ConfigError::InvalidValue {
            field: "logging.level",
            reason: e.to_string(),
        })?;
        let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

        let installed = match self.format {
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Pretty => builder.try_init(),
        };
        installed.map_err(|e| ConfigError::Logging(e.to_string()).into())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of range.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.optimizer.attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "optimizer.attempts",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.optimizer.min_gap == 0 {
            return Err(ConfigError::InvalidValue {
                field: "optimizer.min_gap",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.service.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "service.channel_capacity",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level",
                reason: e.to_string(),
            }
            .into());
        }
        if self.service.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "service.timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
