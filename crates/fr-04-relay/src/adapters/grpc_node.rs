//! # gRPC Node Channel
//!
//! Relay connection to the node's P2P endpoint. Each relay call opens one
//! bidirectional stream on the shared HTTP/2 connection, sends a single
//! message and half-closes.

use crate::domain::RelayError;
use crate::ports::{ChannelState, NodeChannel, NodeConnector};
use async_trait::async_trait;
use shared_types::rpc::p2p::p2p_service_client::P2pServiceClient;
use shared_types::RelayMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{Code, Status};
use tracing::debug;

/// Node relay endpoint settings.
#[derive(Debug, Clone)]
pub struct NodeConnectorConfig {
    /// `host:port` of the node's P2P endpoint.
    pub address: String,
    /// Client credentials; `None` connects in plaintext.
    pub tls: Option<ClientTlsConfig>,
    pub max_message_size: usize,
    pub connect_timeout: Duration,
}

/// Connects [`GrpcNodeChannel`]s.
pub struct GrpcNodeConnector {
    config: NodeConnectorConfig,
}

impl GrpcNodeConnector {
    pub fn new(config: NodeConnectorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl NodeConnector for GrpcNodeConnector {
    async fn connect(&self) -> Result<Arc<dyn NodeChannel>, RelayError> {
        let scheme = if self.config.tls.is_some() { "https" } else { "http" };
        let mut endpoint = Endpoint::from_shared(format!("{}://{}", scheme, self.config.address))
            .map_err(|e| RelayError::Connect(e.to_string()))?
            .connect_timeout(self.config.connect_timeout);
        if let Some(tls) = self.config.tls.clone() {
            endpoint = endpoint
                .tls_config(tls)
                .map_err(|e| RelayError::Connect(e.to_string()))?;
        }
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| RelayError::Connect(format!("{}: {}", self.config.address, e)))?;

        debug!("[fr-04] Connected to node at {}", self.config.address);
        Ok(Arc::new(GrpcNodeChannel::new(channel, self.config.max_message_size)))
    }
}

/// One HTTP/2 connection to the node.
pub struct GrpcNodeChannel {
    client: P2pServiceClient<Channel>,
    failed: AtomicBool,
    closed: AtomicBool,
}

impl GrpcNodeChannel {
    pub fn new(channel: Channel, max_message_size: usize) -> Self {
        let client = P2pServiceClient::new(channel)
            .max_decoding_message_size(max_message_size)
            .max_encoding_message_size(max_message_size);
        Self {
            client,
            failed: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Mark the connection failed on statuses that mean the transport broke.
    fn note_status(&self, status: &Status) {
        if matches!(status.code(), Code::Unavailable | Code::Unknown | Code::Internal) {
            self.failed.store(true, Ordering::Release);
        }
    }

    fn transport_error(&self, status: Status) -> RelayError {
        self.note_status(&status);
        RelayError::Transport(format!("{:?}: {}", status.code(), status.message()))
    }

    async fn open(&self, msg: RelayMessage) -> Result<tonic::Streaming<RelayMessage>, RelayError> {
        let mut client = self.client.clone();
        client
            .send_message(tokio_stream::once(msg))
            .await
            .map(tonic::Response::into_inner)
            .map_err(|s| self.transport_error(s))
    }
}

#[async_trait]
impl NodeChannel for GrpcNodeChannel {
    fn state(&self) -> ChannelState {
        if self.closed.load(Ordering::Acquire) {
            ChannelState::Shutdown
        } else if self.failed.load(Ordering::Acquire) {
            ChannelState::TransientFailure
        } else {
            ChannelState::Ready
        }
    }

    async fn send(&self, msg: RelayMessage) -> Result<(), RelayError> {
        let mut replies = self.open(msg).await?;
        // Drain until the node closes its side.
        loop {
            match replies.message().await {
                Ok(Some(_)) => {}
                Ok(None) => return Ok(()),
                Err(status) => {
                    debug!("[fr-04] Reply stream failed: {}", status);
                    self.note_status(&status);
                    return Ok(());
                }
            }
        }
    }

    async fn request(&self, msg: RelayMessage) -> Result<RelayMessage, RelayError> {
        let mut replies = self.open(msg).await?;
        match replies.message().await {
            Ok(Some(reply)) => Ok(reply),
            Ok(None) => Err(RelayError::NoResponse),
            Err(status) => {
                debug!("[fr-04] Reply stream failed: {}", status);
                self.note_status(&status);
                Err(RelayError::NoResponse)
            }
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
