//! # Front Configuration
//!
//! TOML configuration with per-section defaults and environment overrides.
//!
//! ## Environment Variables
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `FRONT_LISTEN` | `server.listen` |
//! | `FRONT_NODE_HOST` | `server.node_host` |
//! | `FRONT_NODE_RPC` | `server.node_rpc` |
//! | `FRONT_CA_HOST` | `ca.host` |
//! | `FRONT_LOG_LEVEL` | `log.level` |

use front_telemetry::LogConfig;
use fr_03_group_client::DegradePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "./conf/front.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontConfig {
    /// CA partition name; also the TLS domain name.
    pub net_name: String,
    /// Directory with `address`, `private.key` and `public.key`.
    pub keys_path: PathBuf,
    pub server: ServerConfig,
    pub ca: CaConfig,
    pub group: GroupConfig,
    pub store: StoreConfig,
    pub log: LogConfig,
}

impl Default for FrontConfig {
    fn default() -> Self {
        Self {
            net_name: "testnet".to_string(),
            keys_path: PathBuf::from("./data/keys"),
            server: ServerConfig::default(),
            ca: CaConfig::default(),
            group: GroupConfig::default(),
            store: StoreConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Listener and backend endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    /// Backend P2P endpoint (relay target).
    pub node_host: String,
    /// Backend RPC endpoint (membership reads and events).
    pub node_rpc: String,
    pub tls_path: PathBuf,
    /// Root network id. `None` runs in single-network mode.
    pub primary_network: Option<String>,
    pub max_message_size: usize,
    pub max_concurrent_streams: u32,
    /// Deadline for one relayed call to the node.
    pub rpc_timeout_secs: u64,
    /// Deadline for dialing the node's P2P endpoint.
    pub connection_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:57300".to_string(),
            node_host: "127.0.0.1:47101".to_string(),
            node_rpc: "127.0.0.1:37101".to_string(),
            tls_path: PathBuf::from("./data/tls"),
            primary_network: None,
            max_message_size: 128 << 20,
            max_concurrent_streams: 1000,
            rpc_timeout_secs: 3,
            connection_timeout_secs: 20,
        }
    }
}

impl ServerConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

/// Certificate authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaConfig {
    /// Off: plaintext transport and no revocation sync.
    pub enabled: bool,
    pub host: String,
    pub sync_period_secs: u64,
}

impl Default for CaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1:8098".to_string(),
            sync_period_secs: 600,
        }
    }
}

/// Membership cache behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    pub degrade_policy: DegradePolicy,
    pub event_throttle_ms: u64,
}

/// Revocation table backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Rocksdb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: PathBuf::from("./data/revocations"),
        }
    }
}

impl FrontConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Read and parse `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text, &path.display().to_string())
    }

    /// Apply `FRONT_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("FRONT_LISTEN") {
            self.server.listen = v;
        }
        if let Some(v) = lookup("FRONT_NODE_HOST") {
            self.server.node_host = v;
        }
        if let Some(v) = lookup("FRONT_NODE_RPC") {
            self.server.node_rpc = v;
        }
        if let Some(v) = lookup("FRONT_CA_HOST") {
            self.ca.host = v;
        }
        if let Some(v) = lookup("FRONT_LOG_LEVEL") {
            self.log.level = v;
        }
        self
    }

    /// Reject configurations the gateway cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen.trim().is_empty() {
            return Err(ConfigError::Invalid("server.listen is empty".into()));
        }
        if self.server.node_host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.node_host is empty".into()));
        }
        if self.server.node_rpc.trim().is_empty() && self.server.primary_network.is_some() {
            return Err(ConfigError::Invalid(
                "server.node_rpc is required when primary_network is set".into(),
            ));
        }
        if self.server.rpc_timeout_secs == 0 {
            return Err(ConfigError::Invalid("server.rpc_timeout_secs must be > 0".into()));
        }
        if self.ca.enabled && self.ca.host.trim().is_empty() {
            return Err(ConfigError::Invalid("ca.enabled requires ca.host".into()));
        }
        if self.ca.sync_period_secs == 0 {
            return Err(ConfigError::Invalid("ca.sync_period_secs must be > 0".into()));
        }
        if matches!(self.server.primary_network.as_deref(), Some("")) {
            return Err(ConfigError::Invalid("server.primary_network is empty".into()));
        }
        Ok(())
    }
}
