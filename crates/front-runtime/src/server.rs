//! # Front Server
//!
//! Startup sequence and lifecycle of the P2P relay endpoint.
//!
//! ## Startup Sequence
//!
//! 1. CA enabled: write the node certificate if absent, start revocation sync
//! 2. CA enabled: build TLS credentials (fatal on failure)
//! 3. Build the relay connection to the node (TLS when the CA is enabled)
//! 4. Serve, with the authentication interceptor when the CA is enabled

use crate::context::FrontContext;
use anyhow::{Context, Result};
use fr_02_tls_auth::{AuthInterceptor, TlsCredentials};
use fr_04_relay::{GrpcNodeConnector, MessageRelay, NodeConnectorConfig, P2pRelayService};
use shared_types::rpc::p2p::p2p_service_server::P2pServiceServer;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Server;
use tracing::{error, info, warn};

/// A running gateway.
pub struct FrontServer {
    context: Arc<FrontContext>,
    server: JoinHandle<Result<(), tonic::transport::Error>>,
    sync: Option<JoinHandle<()>>,
    local_addr: SocketAddr,
}

impl FrontServer {
    /// Run the startup sequence and begin serving.
    pub async fn start(context: Arc<FrontContext>) -> Result<Self> {
        let config = &context.config;
        let partition = config.net_name.clone();

        if let Some(ca) = &context.ca {
            match ca.fetch_and_write_cert(&partition, &config.server.tls_path).await {
                Ok(true) => info!(partition = %partition, "[runtime] Node certificate fetched"),
                Ok(false) => {}
                Err(e) => warn!(partition = %partition, "[runtime] Certificate fetch failed: {}", e),
            }
        }

        let sync = context
            .sync
            .clone()
            .map(|sync| sync.spawn(partition.clone()));

        let credentials: Option<Arc<TlsCredentials>> = if config.ca.enabled {
            Some(
                context
                    .authenticator
                    .build_credentials()
                    .context("failed to build TLS credentials")?,
            )
        } else {
            None
        };

        let relay = MessageRelay::new(
            Arc::new(GrpcNodeConnector::new(NodeConnectorConfig {
                address: config.server.node_host.clone(),
                tls: credentials.as_ref().map(|c| c.client.clone()),
                max_message_size: config.server.max_message_size,
                connect_timeout: config.server.connection_timeout(),
            })),
            config.server.rpc_timeout(),
        );
        let service = P2pServiceServer::new(P2pRelayService::new(
            context.router.clone(),
            Arc::new(relay),
        ))
        .max_decoding_message_size(config.server.max_message_size)
        .max_encoding_message_size(config.server.max_message_size);

        // Inbound calls are bounded by the relay's rpc_timeout only.
        let mut builder = Server::builder()
            .max_concurrent_streams(Some(config.server.max_concurrent_streams));
        if let Some(creds) = &credentials {
            builder = builder
                .tls_config(creds.server.clone())
                .context("invalid server TLS configuration")?;
        }
        let router = match &credentials {
            Some(_) => builder.add_service(InterceptedService::new(
                service,
                AuthInterceptor::new(context.authenticator.clone()),
            )),
            None => builder.add_service(service),
        };

        let listener = tokio::net::TcpListener::bind(&config.server.listen)
            .await
            .with_context(|| format!("failed to bind {}", config.server.listen))?;
        let local_addr = listener.local_addr()?;
        let incoming = tonic::transport::server::TcpIncoming::from_listener(listener, true, None)
            .map_err(|e| anyhow::anyhow!("failed to accept on {}: {}", local_addr, e))?;

        let mut shutdown = context.shutdown_signal();
        let server = tokio::spawn(router.serve_with_incoming_shutdown(incoming, async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        }));

        info!(
            listen = %local_addr,
            node = %config.server.node_host,
            tls = credentials.is_some(),
            primary = ?config.server.primary_network,
            "[runtime] Chain-Front serving"
        );

        Ok(Self {
            context,
            server,
            sync,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop serving and end background tasks.
    pub async fn stop(self) {
        info!("[runtime] Initiating graceful shutdown");
        self.context.trigger_shutdown();
        if let Some(sync) = self.sync {
            sync.abort();
        }
        match self.server.await {
            Ok(Ok(())) => info!("[runtime] Server stopped"),
            Ok(Err(e)) => error!("[runtime] Server error: {}", e),
            Err(e) => error!("[runtime] Server task failed: {}", e),
        }
    }
}
