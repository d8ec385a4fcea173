//! # gRPC Node Client
//!
//! [`ChainReader`] and [`EventSource`] over one lazily connected channel to
//! the backend node's RPC endpoint.

use crate::domain::GroupError;
use crate::ports::{ChainReader, EventSource, EventStream};
use async_trait::async_trait;
use futures::StreamExt;
use prost::Message;
use shared_types::node::{BlockFilter, InvokeRpcRequest, InvokeRpcResponse, SubscribeRequest, SubscribeType};
use shared_types::rpc::node::event_service_client::EventServiceClient;
use shared_types::rpc::node::node_service_client::NodeServiceClient;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

/// Node RPC client settings.
#[derive(Debug, Clone)]
pub struct NodeClientConfig {
    /// `host:port` of the node RPC endpoint.
    pub address: String,
    /// Per-call deadline for unary calls, TCP connects and opening a
    /// subscription.
    pub call_timeout: Duration,
    /// Largest message accepted from the node.
    pub max_message_size: usize,
    /// HTTP/2 keepalive ping interval.
    pub keepalive_interval: Duration,
    /// Keepalive ack deadline.
    pub keepalive_timeout: Duration,
}

impl NodeClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            call_timeout: Duration::from_secs(20),
            max_message_size: 1024 * 1024 * 1024,
            keepalive_interval: Duration::from_secs(10),
            keepalive_timeout: Duration::from_secs(5),
        }
    }
}

/// Backend node RPC client.
#[derive(Clone)]
pub struct GrpcNodeClient {
    channel: Channel,
    config: NodeClientConfig,
}

impl GrpcNodeClient {
    /// Create the client; the connection is made on first use.
    pub fn connect_lazy(config: NodeClientConfig) -> Result<Self, GroupError> {
        let channel = Endpoint::from_shared(format!("http://{}", config.address))
            .map_err(|e| GroupError::PreExec(format!("invalid node address {}: {}", config.address, e)))?
            .connect_timeout(config.call_timeout)
            .http2_keep_alive_interval(config.keepalive_interval)
            .keep_alive_timeout(config.keepalive_timeout)
            .keep_alive_while_idle(true)
            .connect_lazy();
        Ok(Self { channel, config })
    }
}

#[async_trait]
impl ChainReader for GrpcNodeClient {
    async fn pre_exec(&self, request: InvokeRpcRequest) -> Result<InvokeRpcResponse, GroupError> {
        let mut client = NodeServiceClient::new(self.channel.clone())
            .max_decoding_message_size(self.config.max_message_size);
        let mut request = tonic::Request::new(request);
        request.set_timeout(self.config.call_timeout);
        client
            .pre_exec(request)
            .await
            .map(tonic::Response::into_inner)
            .map_err(|s| GroupError::PreExec(format!("{:?}: {}", s.code(), s.message())))
    }
}

#[async_trait]
impl EventSource for GrpcNodeClient {
    async fn subscribe(&self, filter: BlockFilter) -> Result<EventStream, GroupError> {
        let mut client = EventServiceClient::new(self.channel.clone())
            .max_decoding_message_size(self.config.max_message_size);
        let request = SubscribeRequest {
            sub_type: SubscribeType::Block as i32,
            filter: filter.encode_to_vec(),
        };
        // Only the open is bounded; the stream itself is long-lived.
        let stream = tokio::time::timeout(self.config.call_timeout, client.subscribe(request))
            .await
            .map_err(|_| {
                GroupError::Subscribe(format!(
                    "no response within {:?}",
                    self.config.call_timeout
                ))
            })?
            .map_err(|s| GroupError::Subscribe(format!("{:?}: {}", s.code(), s.message())))?
            .into_inner();

        Ok(stream
            .map(|item| {
                item.map(|event| event.payload)
                    .map_err(|s| GroupError::Stream(format!("{:?}: {}", s.code(), s.message())))
            })
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_node_fails_pre_exec() {
        let mut config = NodeClientConfig::new("127.0.0.1:1");
        config.call_timeout = Duration::from_millis(500);
        let client = GrpcNodeClient::connect_lazy(config).unwrap();

        let err = client.pre_exec(InvokeRpcRequest::default()).await.unwrap_err();
        assert!(matches!(err, GroupError::PreExec(_)));
    }

    #[tokio::test]
    async fn test_unreachable_node_fails_subscribe() {
        let client = GrpcNodeClient::connect_lazy(NodeClientConfig::new("127.0.0.1:1")).unwrap();
        let result = client.subscribe(BlockFilter::default()).await;
        assert!(matches!(result, Err(GroupError::Subscribe(_))));
    }

    #[tokio::test]
    async fn test_silent_node_subscribe_times_out() {
        // Accepts TCP connections and never speaks HTTP/2.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut config = NodeClientConfig::new(address);
        config.call_timeout = Duration::from_millis(300);
        let client = GrpcNodeClient::connect_lazy(config).unwrap();

        let started = std::time::Instant::now();
        let result = client.subscribe(BlockFilter::default()).await;
        assert!(matches!(result, Err(GroupError::Subscribe(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
