//! # P2P Relay Service
//!
//! gRPC entry point for peer streams. Each stream carries one message:
//! authorize it, relay it, and stream back the node's reply if there is one.

use super::{AuthorizationRouter, MessageRelay};
use crate::domain::RouterError;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use shared_types::rpc::p2p::p2p_service_server::P2pService;
use shared_types::{PeerIdentity, RelayMessage};
use std::sync::Arc;
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, warn};

/// Relay service behind the authentication interceptor.
pub struct P2pRelayService {
    router: Arc<AuthorizationRouter>,
    relay: Arc<MessageRelay>,
}

impl P2pRelayService {
    pub fn new(router: Arc<AuthorizationRouter>, relay: Arc<MessageRelay>) -> Self {
        Self { router, relay }
    }

    /// Authorize and relay one inbound message.
    ///
    /// `peer` is the identity attached by the interceptor; it is required
    /// only for partition traffic.
    pub async fn handle_message(
        &self,
        peer: Option<&PeerIdentity>,
        msg: RelayMessage,
    ) -> Result<Option<RelayMessage>, Status> {
        let partition = msg.bcname().to_string();

        if !self.router.is_open(&partition) {
            let peer = peer.ok_or(RouterError::PeerMissing)?;
            if let Err(e) = self.router.authorize(&partition, peer.address()).await {
                warn!(
                    log_id = %msg.log_id(),
                    partition = %partition,
                    peer = %peer,
                    "[fr-04] Rejected: {}",
                    e
                );
                return Err(e.into());
            }
        }

        debug!(
            log_id = %msg.log_id(),
            partition = %partition,
            msg_type = ?msg.message_type(),
            "[fr-04] Relaying message"
        );
        self.relay.relay(msg).await.map_err(|e| {
            warn!(partition = %partition, "[fr-04] Relay failed: {}", e);
            Status::from(e)
        })
    }
}

#[async_trait]
impl P2pService for P2pRelayService {
    type SendMessageStream = BoxStream<'static, Result<RelayMessage, Status>>;

    async fn send_message(
        &self,
        request: Request<Streaming<RelayMessage>>,
    ) -> Result<Response<Self::SendMessageStream>, Status> {
        let peer = request.extensions().get::<PeerIdentity>().cloned();
        let mut inbound = request.into_inner();

        let Some(msg) = inbound.message().await? else {
            return Ok(Response::new(stream::empty().boxed()));
        };

        let reply = self.handle_message(peer.as_ref(), msg).await?;
        Ok(Response::new(stream::iter(reply.map(Ok)).boxed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockNodeConnector;
    use async_trait::async_trait;
    use fr_03_group_client::{
        DefaultGroupClientFactory, GroupClient, GroupClientFactory, GroupError, MockChainReader,
        ScriptedEventSource,
    };
    use shared_types::{GroupPayload, MessageType};
    use std::time::Duration;
    use tokio::sync::watch;
    use tonic::Code;

    struct Fixture {
        service: P2pRelayService,
        connector: Arc<MockNodeConnector>,
        _shutdown: watch::Sender<bool>,
    }

    struct Unreachable;

    fn unreachable() -> Option<Arc<dyn GroupClientFactory>> {
        Some(Arc::new(Unreachable))
    }

    #[async_trait]
    impl GroupClientFactory for Unreachable {
        async fn create(&self, _partition: &str) -> Result<Arc<GroupClient>, GroupError> {
            Err(GroupError::PreExec("connection refused".into()))
        }
    }

    fn fixture(primary: Option<&str>, factory: Option<Arc<dyn GroupClientFactory>>) -> Fixture {
        let (tx, rx) = watch::channel(false);
        let factory = factory.unwrap_or_else(|| {
            let reader = MockChainReader::with_group(&GroupPayload {
                group_id: "p1".into(),
                admin: vec!["ADMIN".into()],
                identities: vec!["X".into()],
            });
            let factory: Arc<dyn GroupClientFactory> = Arc::new(DefaultGroupClientFactory::new(
                Arc::new(reader),
                Arc::new(ScriptedEventSource::new()),
                "xuper",
                "me",
                rx,
            ));
            factory
        });
        let reply = RelayMessage::new("p1", MessageType::GetBlockRes, b"block".to_vec());
        let connector = Arc::new(MockNodeConnector::new(Some(reply)));
        let router = AuthorizationRouter::new(primary.map(String::from), factory);
        let relay = MessageRelay::new(connector.clone(), Duration::from_secs(3));
        Fixture {
            service: P2pRelayService::new(Arc::new(router), Arc::new(relay)),
            connector,
            _shutdown: tx,
        }
    }

    #[tokio::test]
    async fn test_member_query_gets_reply() {
        let f = fixture(Some("xuper"), None);
        let peer = PeerIdentity::new("X");

        let reply = f
            .service
            .handle_message(Some(&peer), RelayMessage::new("p1", MessageType::GetBlock, vec![]))
            .await
            .unwrap();

        assert_eq!(reply.unwrap().data, b"block".to_vec());
        assert_eq!(f.connector.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_non_member_rejected_without_relay() {
        let f = fixture(Some("xuper"), None);
        let peer = PeerIdentity::new("Y");

        let err = f
            .service
            .handle_message(Some(&peer), RelayMessage::new("p1", MessageType::GetBlock, vec![]))
            .await
            .unwrap_err();

        assert_eq!(err.code(), Code::PermissionDenied);
        assert_eq!(f.connector.connects(), 0);
    }

    #[tokio::test]
    async fn test_partition_traffic_requires_peer() {
        let f = fixture(Some("xuper"), None);
        let err = f
            .service
            .handle_message(None, RelayMessage::new("p1", MessageType::GetBlock, vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Unauthenticated);
    }

    #[tokio::test]
    async fn test_primary_traffic_relayed_without_lookup() {
        let f = fixture(Some("xuper"), unreachable());
        let peer = PeerIdentity::new("ANYONE");

        let reply = f
            .service
            .handle_message(Some(&peer), RelayMessage::new("xuper", MessageType::PostTx, vec![]))
            .await
            .unwrap();
        assert_eq!(reply, None);
    }

    #[tokio::test]
    async fn test_unavailable_group_is_permission_denied() {
        let f = fixture(Some("xuper"), unreachable());
        let peer = PeerIdentity::new("X");
        let err = f
            .service
            .handle_message(Some(&peer), RelayMessage::new("p1", MessageType::GetBlock, vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::PermissionDenied);
    }

    #[tokio::test]
    async fn test_relay_failure_is_unavailable() {
        let f = fixture(None, None);
        f.connector.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        let err = f
            .service
            .handle_message(None, RelayMessage::new("p1", MessageType::GetBlock, vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Code::Unavailable);
    }
}
