//! # Message Relay
//!
//! Forwards authorized messages to the backend node over one shared
//! connection, rebuilt lazily when its transport has failed.

use crate::domain::RelayError;
use crate::ports::{NodeChannel, NodeConnector};
use shared_types::{DeliveryMode, RelayMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Relay to the backend node.
pub struct MessageRelay {
    connector: Arc<dyn NodeConnector>,
    channel: Mutex<Option<Arc<dyn NodeChannel>>>,
    rpc_timeout: Duration,
}

impl MessageRelay {
    pub fn new(connector: Arc<dyn NodeConnector>, rpc_timeout: Duration) -> Self {
        Self {
            connector,
            channel: Mutex::new(None),
            rpc_timeout,
        }
    }

    /// Current channel, rebuilt if missing or no longer usable.
    async fn channel(&self) -> Result<Arc<dyn NodeChannel>, RelayError> {
        let mut slot = self.channel.lock().await;
        if let Some(channel) = slot.as_ref() {
            let state = channel.state();
            if state.is_usable() {
                return Ok(channel.clone());
            }
            info!(state = ?state, "[fr-04] Rebuilding node connection");
            channel.close();
        }

        // A failed connect leaves the slot empty so the next call retries.
        *slot = None;
        let channel = self.connector.connect().await?;
        *slot = Some(channel.clone());
        Ok(channel)
    }

    /// Forward `msg` to the node.
    ///
    /// Fire-and-forget types return `Ok(None)` as soon as the send is
    /// scheduled. Every other type waits for the node's single reply.
    pub async fn relay(&self, msg: RelayMessage) -> Result<Option<RelayMessage>, RelayError> {
        let channel = self.channel().await?;

        match msg.delivery_mode() {
            DeliveryMode::FireAndForget => {
                let timeout = self.rpc_timeout;
                let log_id = msg.log_id().to_string();
                tokio::spawn(async move {
                    match tokio::time::timeout(timeout, channel.send(msg)).await {
                        Ok(Ok(())) => debug!(log_id = %log_id, "[fr-04] Message delivered"),
                        Ok(Err(e)) => warn!(log_id = %log_id, "[fr-04] Send failed: {}", e),
                        Err(_) => warn!(log_id = %log_id, "[fr-04] Send timed out"),
                    }
                });
                Ok(None)
            }
            DeliveryMode::RequestResponse => {
                match tokio::time::timeout(self.rpc_timeout, channel.request(msg)).await {
                    Ok(result) => result.map(Some),
                    Err(_) => Err(RelayError::Timeout),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{ChannelState, MockNodeConnector};
    use shared_types::MessageType;
    use std::sync::atomic::Ordering;
    use std::time::Instant;

    fn reply() -> RelayMessage {
        RelayMessage::new("xuper", MessageType::GetBlockRes, b"block".to_vec())
    }

    #[tokio::test]
    async fn test_fire_and_forget_returns_immediately() {
        let connector = Arc::new(MockNodeConnector::new(None).with_delay(Duration::from_millis(300)));
        let relay = MessageRelay::new(connector.clone(), Duration::from_secs(3));

        let started = Instant::now();
        let result = relay
            .relay(RelayMessage::new("xuper", MessageType::PostTx, b"tx".to_vec()))
            .await
            .unwrap();

        assert_eq!(result, None);
        assert!(started.elapsed() < Duration::from_millis(200));

        // The send still completes in the background.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(connector.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_request_returns_reply() {
        let connector = Arc::new(MockNodeConnector::new(Some(reply())));
        let relay = MessageRelay::new(connector, Duration::from_secs(3));

        let result = relay
            .relay(RelayMessage::new("xuper", MessageType::GetBlock, vec![]))
            .await
            .unwrap();
        assert_eq!(result, Some(reply()));
    }

    #[tokio::test]
    async fn test_missing_reply_is_no_response() {
        let relay = MessageRelay::new(Arc::new(MockNodeConnector::new(None)), Duration::from_secs(3));
        let err = relay
            .relay(RelayMessage::new("xuper", MessageType::GetBlock, vec![]))
            .await
            .unwrap_err();
        assert_eq!(err, RelayError::NoResponse);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_reply_times_out() {
        let connector = MockNodeConnector::new(Some(reply())).with_delay(Duration::from_secs(10));
        let relay = MessageRelay::new(Arc::new(connector), Duration::from_secs(3));
        let err = relay
            .relay(RelayMessage::new("xuper", MessageType::GetBlock, vec![]))
            .await
            .unwrap_err();
        assert_eq!(err, RelayError::Timeout);
    }

    #[tokio::test]
    async fn test_connection_reused_while_ready() {
        let connector = Arc::new(MockNodeConnector::new(Some(reply())));
        let relay = MessageRelay::new(connector.clone(), Duration::from_secs(3));

        for _ in 0..3 {
            relay
                .relay(RelayMessage::new("xuper", MessageType::GetBlock, vec![]))
                .await
                .unwrap();
        }
        assert_eq!(connector.connects(), 1);
    }

    #[tokio::test]
    async fn test_failed_connection_rebuilt() {
        let connector = Arc::new(MockNodeConnector::new(Some(reply())));
        let relay = MessageRelay::new(connector.clone(), Duration::from_secs(3));
        let msg = || RelayMessage::new("xuper", MessageType::GetBlock, vec![]);

        relay.relay(msg()).await.unwrap();
        let stale = connector.last_channel().unwrap();
        stale.set_state(ChannelState::TransientFailure);

        relay.relay(msg()).await.unwrap();

        assert_eq!(connector.connects(), 2);
        assert!(stale.closed.load(Ordering::SeqCst));
        assert_eq!(stale.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_reported_then_retried() {
        let connector = Arc::new(MockNodeConnector::new(Some(reply())));
        connector.fail.store(true, Ordering::SeqCst);
        let relay = MessageRelay::new(connector.clone(), Duration::from_secs(3));
        let msg = || RelayMessage::new("xuper", MessageType::GetBlock, vec![]);

        assert!(matches!(relay.relay(msg()).await, Err(RelayError::Connect(_))));

        connector.fail.store(false, Ordering::SeqCst);
        assert!(relay.relay(msg()).await.is_ok());
    }
}
