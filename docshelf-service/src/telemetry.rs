//! Tracing Initialization
//!
//! Installs the process-wide `tracing` subscriber: an `EnvFilter` driven by
//! `RUST_LOG` and a fmt layer emitting either JSON lines or human-readable
//! output.

use std::str::FromStr;

use docshelf_core::{ConfigError, DocshelfError, DocshelfResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "docshelf=debug,info";

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::InvalidValue {
                field: "DOCSHELF_LOG_FORMAT".to_string(),
                value: other.to_string(),
                reason: "expected json or pretty".to_string(),
            }),
        }
    }
}

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup event
    pub service_name: String,
    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "docshelf".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl TelemetryConfig {
    /// Environment variables:
    /// - `DOCSHELF_SERVICE_NAME`: Service name (default: docshelf)
    /// - `DOCSHELF_LOG_FORMAT`: "json" or "pretty" (default: json)
    pub fn from_env() -> Result<Self, ConfigError> {
        let service_name = std::env::var("DOCSHELF_SERVICE_NAME")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "docshelf".to_string());
        let log_format = match std::env::var("DOCSHELF_LOG_FORMAT") {
            Ok(value) => value.parse()?,
            Err(_) => LogFormat::default(),
        };
        Ok(Self {
            service_name,
            log_format,
        })
    }
}

/// Install the global subscriber. Call once at startup; a second call
/// fails because a subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> DocshelfResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    };
    result.map_err(|e| DocshelfError::internal(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = %config.service_name,
        log_format = ?config.log_format,
        "Telemetry initialized"
    );
    Ok(())
}
