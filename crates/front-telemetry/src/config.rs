//! Logging configuration: a `[log]` config section plus environment overrides.

use serde::{Deserialize, Serialize};
use std::env;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for consoles.
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive (`info`, `debug`, `fr_03_group_client=trace`, ...)
    pub level: String,

    /// Output format
    pub format: LogFormat,

    /// Include thread ids in each line
    pub thread_ids: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            thread_ids: true,
        }
    }
}

impl LogConfig {
    /// Apply environment overrides.
    ///
    /// # Environment Variables
    ///
    /// - `FRONT_LOG_LEVEL` or `RUST_LOG`: filter directive
    /// - `FRONT_JSON_LOGS`: `true`/`1` forces JSON output
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = env::var("FRONT_LOG_LEVEL").or_else(|_| env::var("RUST_LOG")) {
            self.level = level;
        }
        if let Ok(v) = env::var("FRONT_JSON_LOGS") {
            if v.eq_ignore_ascii_case("true") || v == "1" {
                self.format = LogFormat::Json;
            }
        }
        self
    }
}
