//! # Front Context
//!
//! Dependency container built once at startup. Every long-lived component is
//! constructed here from [`FrontConfig`] and shared by `Arc`.
//!
//! ## Wiring
//!
//! ```text
//! keys_path ──→ CertSigner ─┬─→ CaOperations (enroll, cert bootstrap)
//!                           ├─→ RevocationSync ──→ RevocationStore
//!                           └─→ initiator for membership reads
//!
//! RevocationStore ──→ TlsAuthenticator
//! node_rpc ──→ GrpcNodeClient ──→ DefaultGroupClientFactory ──→ AuthorizationRouter
//! ```

use crate::config::{FrontConfig, StoreBackend};
use anyhow::{Context, Result};
use fr_01_revocation::{
    load_signer, CaClient, CaOperations, CertSigner, GrpcCaClient, InMemoryRevocationStore,
    RevocationStore, RevocationSync,
};
use fr_02_tls_auth::{TlsAuthConfig, TlsAuthenticator};
use fr_03_group_client::{DefaultGroupClientFactory, GrpcNodeClient, NodeClientConfig};
use fr_04_relay::AuthorizationRouter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Shared gateway components.
pub struct FrontContext {
    pub config: FrontConfig,
    /// Local node key. Present when the CA is enabled or partition routing is on.
    pub signer: Option<Arc<dyn CertSigner>>,
    pub store: Arc<dyn RevocationStore>,
    /// CA operations and the revocation job. Present when the CA is enabled.
    pub ca: Option<Arc<CaOperations>>,
    pub sync: Option<Arc<RevocationSync>>,
    pub authenticator: Arc<TlsAuthenticator>,
    pub router: Arc<AuthorizationRouter>,
    shutdown_tx: watch::Sender<bool>,
}

impl FrontContext {
    /// Build every component. Must run inside a Tokio runtime.
    pub fn build(config: FrontConfig) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let needs_key = config.ca.enabled || config.server.primary_network.is_some();
        let signer = if needs_key {
            let signer = load_signer(&config.keys_path).with_context(|| {
                format!("failed to load node key from {}", config.keys_path.display())
            })?;
            info!(address = %signer.address(), "[runtime] Node key loaded");
            Some(signer)
        } else {
            None
        };

        let store = open_store(&config)?;

        let (ca, sync) = match (&signer, config.ca.enabled) {
            (Some(signer), true) => {
                let client: Arc<dyn CaClient> = Arc::new(GrpcCaClient::new(config.ca.host.clone()));
                let ops = Arc::new(CaOperations::new(client.clone(), signer.clone()));
                let sync = Arc::new(
                    RevocationSync::new(store.clone(), client, signer.clone())
                        .with_period(Duration::from_secs(config.ca.sync_period_secs)),
                );
                (Some(ops), Some(sync))
            }
            _ => (None, None),
        };

        let authenticator = Arc::new(TlsAuthenticator::new(
            TlsAuthConfig {
                tls_dir: config.server.tls_path.clone(),
                domain_name: config.net_name.clone(),
                routing_enabled: config.server.primary_network.is_some(),
            },
            store.clone(),
        ));

        let node = Arc::new(
            GrpcNodeClient::connect_lazy(NodeClientConfig::new(config.server.node_rpc.clone()))
                .context("invalid node RPC address")?,
        );
        let initiator = signer
            .as_ref()
            .map(|s| s.address().to_string())
            .unwrap_or_default();
        let factory = DefaultGroupClientFactory::new(
            node.clone(),
            node,
            config.server.primary_network.clone().unwrap_or_default(),
            initiator,
            shutdown_rx,
        )
        .with_degrade_policy(config.group.degrade_policy)
        .with_event_throttle(Duration::from_millis(config.group.event_throttle_ms));
        let router = Arc::new(AuthorizationRouter::new(
            config.server.primary_network.clone(),
            Arc::new(factory),
        ));

        Ok(Self {
            config,
            signer,
            store,
            ca,
            sync,
            authenticator,
            router,
            shutdown_tx,
        })
    }

    /// Receiver that turns `true` when the gateway stops.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Signal every background task to stop.
    pub fn trigger_shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }
}

fn open_store(config: &FrontConfig) -> Result<Arc<dyn RevocationStore>> {
    match config.store.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryRevocationStore::new())),
        #[cfg(feature = "rocksdb")]
        StoreBackend::Rocksdb => {
            let store = fr_01_revocation::RocksDbRevocationStore::open(
                fr_01_revocation::RocksDbStoreConfig {
                    path: config.store.path.display().to_string(),
                    sync_writes: true,
                },
            )
            .context("failed to open revocation store")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "rocksdb"))]
        StoreBackend::Rocksdb => anyhow::bail!("store.backend = \"rocksdb\" requires the rocksdb feature"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plaintext_config() -> FrontConfig {
        let mut config = FrontConfig::default();
        config.ca.enabled = false;
        config
    }

    #[tokio::test]
    async fn test_build_without_key_in_plaintext_mode() {
        let ctx = FrontContext::build(plaintext_config()).unwrap();
        assert!(ctx.signer.is_none());
        assert!(ctx.ca.is_none());
        assert!(ctx.sync.is_none());
        assert!(!ctx.router.routing_enabled());
        assert!(!ctx.authenticator.routing_enabled());
    }

    #[tokio::test]
    async fn test_build_requires_key_when_ca_enabled() {
        let mut config = FrontConfig::default();
        config.keys_path = "/nonexistent/keys".into();
        assert!(FrontContext::build(config).is_err());
    }

    #[tokio::test]
    async fn test_shutdown_signal() {
        let ctx = FrontContext::build(plaintext_config()).unwrap();
        let rx = ctx.shutdown_signal();
        assert!(!*rx.borrow());
        ctx.trigger_shutdown();
        assert!(*rx.borrow());
    }

    #[cfg(not(feature = "rocksdb"))]
    #[tokio::test]
    async fn test_rocksdb_backend_needs_feature() {
        let mut config = plaintext_config();
        config.store.backend = StoreBackend::Rocksdb;
        assert!(FrontContext::build(config).is_err());
    }
}
