//! # Outbound Ports
//!
//! The relay connection to the backend node.

use crate::domain::RelayError;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::RelayMessage;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Transport state of a node channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Usable.
    Ready,
    /// A call failed at the transport level; rebuild before reuse.
    TransientFailure,
    /// Closed.
    Shutdown,
}

impl ChannelState {
    pub fn is_usable(self) -> bool {
        self == ChannelState::Ready
    }
}

/// One connection to the backend node's relay endpoint.
#[async_trait]
pub trait NodeChannel: Send + Sync {
    fn state(&self) -> ChannelState;

    /// Deliver `msg` without waiting for a reply.
    async fn send(&self, msg: RelayMessage) -> Result<(), RelayError>;

    /// Deliver `msg` and wait for exactly one reply.
    async fn request(&self, msg: RelayMessage) -> Result<RelayMessage, RelayError>;

    fn close(&self);
}

/// Builds node channels.
#[async_trait]
pub trait NodeConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn NodeChannel>, RelayError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Node channel recording what it was sent.
pub struct MockNodeChannel {
    pub state: Mutex<ChannelState>,
    pub sent: Mutex<Vec<RelayMessage>>,
    /// Reply to `request`; `None` models a stream that ends without one.
    pub reply: Option<RelayMessage>,
    /// Delay before `send`/`request` complete.
    pub delay: Option<Duration>,
    pub closed: AtomicBool,
}

impl MockNodeChannel {
    pub fn new(reply: Option<RelayMessage>, delay: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(ChannelState::Ready),
            sent: Mutex::new(Vec::new()),
            reply,
            delay,
            closed: AtomicBool::new(false),
        }
    }

    pub fn set_state(&self, state: ChannelState) {
        *self.state.lock() = state;
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl NodeChannel for MockNodeChannel {
    fn state(&self) -> ChannelState {
        *self.state.lock()
    }

    async fn send(&self, msg: RelayMessage) -> Result<(), RelayError> {
        self.pause().await;
        self.sent.lock().push(msg);
        Ok(())
    }

    async fn request(&self, msg: RelayMessage) -> Result<RelayMessage, RelayError> {
        self.pause().await;
        self.sent.lock().push(msg);
        self.reply.clone().ok_or(RelayError::NoResponse)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.set_state(ChannelState::Shutdown);
    }
}

/// Connector handing out a fresh [`MockNodeChannel`] per connect.
#[derive(Default)]
pub struct MockNodeConnector {
    pub reply: Option<RelayMessage>,
    pub delay: Option<Duration>,
    pub fail: AtomicBool,
    connects: AtomicUsize,
    channels: Mutex<Vec<Arc<MockNodeChannel>>>,
}

impl MockNodeConnector {
    pub fn new(reply: Option<RelayMessage>) -> Self {
        Self {
            reply,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Most recently built channel.
    pub fn last_channel(&self) -> Option<Arc<MockNodeChannel>> {
        self.channels.lock().last().cloned()
    }

    /// Every message sent on any channel.
    pub fn sent(&self) -> Vec<RelayMessage> {
        self.channels
            .lock()
            .iter()
            .flat_map(|c| c.sent.lock().clone())
            .collect()
    }
}

#[async_trait]
impl NodeConnector for MockNodeConnector {
    async fn connect(&self) -> Result<Arc<dyn NodeChannel>, RelayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RelayError::Connect("connection refused".into()));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        let channel = Arc::new(MockNodeChannel::new(self.reply.clone(), self.delay));
        self.channels.lock().push(channel.clone());
        Ok(channel)
    }
}
