//! # Front Telemetry
//!
//! Structured logging for Chain-Front built on `tracing`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use front_telemetry::{init_logging, LogConfig};
//!
//! let config = LogConfig::default().with_env_overrides();
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FRONT_LOG_LEVEL` | `info` | Filter directive (falls back to `RUST_LOG`) |
//! | `FRONT_JSON_LOGS` | `false` | Emit JSON lines |

mod config;
mod logging;

pub use config::{LogConfig, LogFormat};
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}
