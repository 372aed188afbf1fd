//! Structured logging setup for the bootstrap, built on `tracing`.
//!
//! This is the crate's own diagnostics channel; the engine-level `logImpl`
//! extension selected by a document is independent of it.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
        }
    }
}

/// Initialize the logging system.
///
/// The `MAPBIND_LOG` environment variable overrides the configured level.
/// Returns an error if a subscriber is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), BuildError> {
    let default = config.map(|c| c.level.clone()).unwrap_or_else(default_log_level);
    let filter = EnvFilter::try_from_env("MAPBIND_LOG")
        .or_else(|_| EnvFilter::try_new(&default))
        .map_err(|e| BuildError::Logging(format!("invalid log filter '{}': {}", default, e)))?;

    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    let builder = fmt().with_env_filter(filter);
    let result = if format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| BuildError::Logging(e.to_string()))
}
