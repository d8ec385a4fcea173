//! # Chain-Front Runtime
//!
//! Configuration, dependency wiring and server lifecycle for the
//! `chain-front` binary.
//!
//! ## Modules
//!
//! - `config` - TOML configuration with environment overrides
//! - `context` - [`FrontContext`] dependency container
//! - `server` - [`FrontServer`] startup sequence, `start`/`stop`

pub mod config;
pub mod context;
pub mod server;

pub use config::{ConfigError, FrontConfig, StoreBackend, DEFAULT_CONFIG_PATH};
pub use context::FrontContext;
pub use server::FrontServer;
