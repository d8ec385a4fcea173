//! Creation of initialized group clients.

use super::{GroupClient, GroupClientConfig};
use crate::domain::{DegradePolicy, GroupError};
use crate::ports::{ChainReader, EventSource};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Builds and initializes the client for a partition.
#[async_trait]
pub trait GroupClientFactory: Send + Sync {
    /// A client that has completed [`GroupClient::init`].
    async fn create(&self, partition: &str) -> Result<Arc<GroupClient>, GroupError>;
}

/// Factory sharing one node connection across all partitions.
pub struct DefaultGroupClientFactory {
    reader: Arc<dyn ChainReader>,
    events: Arc<dyn EventSource>,
    primary_network: String,
    initiator: String,
    degrade_policy: DegradePolicy,
    event_throttle: Duration,
    subscribe_timeout: Duration,
    shutdown: watch::Receiver<bool>,
}

impl DefaultGroupClientFactory {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        events: Arc<dyn EventSource>,
        primary_network: impl Into<String>,
        initiator: impl Into<String>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            reader,
            events,
            primary_network: primary_network.into(),
            initiator: initiator.into(),
            degrade_policy: DegradePolicy::default(),
            event_throttle: Duration::ZERO,
            subscribe_timeout: Duration::from_secs(20),
            shutdown,
        }
    }

    pub fn with_degrade_policy(mut self, policy: DegradePolicy) -> Self {
        self.degrade_policy = policy;
        self
    }

    pub fn with_event_throttle(mut self, throttle: Duration) -> Self {
        self.event_throttle = throttle;
        self
    }

    pub fn with_subscribe_timeout(mut self, timeout: Duration) -> Self {
        self.subscribe_timeout = timeout;
        self
    }
}

#[async_trait]
impl GroupClientFactory for DefaultGroupClientFactory {
    async fn create(&self, partition: &str) -> Result<Arc<GroupClient>, GroupError> {
        let client = GroupClient::new(
            GroupClientConfig {
                partition: partition.to_string(),
                primary_network: self.primary_network.clone(),
                initiator: self.initiator.clone(),
                degrade_policy: self.degrade_policy,
                event_throttle: self.event_throttle,
                subscribe_timeout: self.subscribe_timeout,
            },
            self.reader.clone(),
            self.events.clone(),
            self.shutdown.clone(),
        );
        client.init().await?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockChainReader, ScriptedEventSource};
    use shared_types::GroupPayload;

    #[tokio::test]
    async fn test_create_initializes() {
        let reader = Arc::new(MockChainReader::with_group(&GroupPayload {
            group_id: "p1".into(),
            admin: vec!["A".into()],
            identities: vec![],
        }));
        let events = Arc::new(ScriptedEventSource::new());
        let (_tx, rx) = watch::channel(false);
        let factory = DefaultGroupClientFactory::new(reader, events.clone(), "xuper", "me", rx);

        let client = factory.create("p1").await.unwrap();
        assert!(client.snapshot().contains("A"));
        assert_eq!(events.subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_create_propagates_init_failure() {
        let (_tx, rx) = watch::channel(false);
        let factory = DefaultGroupClientFactory::new(
            Arc::new(MockChainReader::unreachable()),
            Arc::new(ScriptedEventSource::new()),
            "xuper",
            "me",
            rx,
        );
        assert!(factory.create("p1").await.is_err());
    }
}
