//! # IBC Proxy Telemetry
//!
//! Logging and metrics shared by the proxy workspace.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ibc_proxy_telemetry::{init_logging, register_metrics, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! register_metrics()?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `ibc-proxy` | Service name in logs |
//! | `PROXY_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `PROXY_JSON_LOGS` | `false` | JSON log lines |
//! | `PROXY_CONSOLE_OUTPUT` | `true` | Console output |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging, init_test_logging};
pub use metrics::{
    encode_metrics, record_bootstrap, record_commitment, record_handshake_step,
    record_multihop_verification, record_verification, register_metrics, BOOTSTRAP_REQUESTS,
    COMMITMENTS_WRITTEN, HANDSHAKE_STEPS, MULTIHOP_VERIFICATIONS, REGISTRY, VERIFICATIONS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = TelemetryError::MetricsInit("duplicate".into());
        assert!(err.to_string().contains("duplicate"));
    }
}
