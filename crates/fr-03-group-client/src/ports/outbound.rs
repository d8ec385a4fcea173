//! # Outbound Ports
//!
//! The backend node as seen by the group client: a contract reader and a
//! block event feed.

use crate::domain::GroupError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use parking_lot::Mutex;
use prost::Message;
use shared_types::node::{
    BlockFilter, ContractEvent, ContractResponse, FilteredBlock, FilteredTransaction, InvokeResponse,
    InvokeRpcRequest, InvokeRpcResponse,
};
use shared_types::{GroupPayload, PARACHAIN_GROUP_EVENT};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Encoded block payloads from a live subscription.
pub type EventStream = BoxStream<'static, Result<Vec<u8>, GroupError>>;

/// Contract pre-execution against the backend node.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn pre_exec(&self, request: InvokeRpcRequest) -> Result<InvokeRpcResponse, GroupError>;
}

/// Block event subscription against the backend node.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Open a stream of encoded [`FilteredBlock`]s matching `filter`.
    async fn subscribe(&self, filter: BlockFilter) -> Result<EventStream, GroupError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Chain reader answering every pre-exec with one contract response.
pub struct MockChainReader {
    pub status: i32,
    pub body: Vec<u8>,
    /// Fail the call itself.
    pub unreachable: bool,
    pub requests: Mutex<Vec<InvokeRpcRequest>>,
}

impl MockChainReader {
    /// Reply 200 with `group` as body.
    pub fn with_group(group: &GroupPayload) -> Self {
        Self::with_status(200, serde_json_body(group))
    }

    pub fn with_status(status: i32, body: Vec<u8>) -> Self {
        Self {
            status,
            body,
            unreachable: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::with_status(0, Vec::new())
        }
    }
}

fn serde_json_body(group: &GroupPayload) -> Vec<u8> {
    serde_json::to_vec(group).unwrap_or_default()
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn pre_exec(&self, request: InvokeRpcRequest) -> Result<InvokeRpcResponse, GroupError> {
        self.requests.lock().push(request);
        if self.unreachable {
            return Err(GroupError::PreExec("connection refused".into()));
        }
        Ok(InvokeRpcResponse {
            response: Some(InvokeResponse {
                responses: vec![ContractResponse {
                    status: self.status,
                    message: String::new(),
                    body: self.body.clone(),
                }],
                gas_used: 0,
            }),
            ..Default::default()
        })
    }
}

/// Event source whose streams are driven by the test.
///
/// Every successful `subscribe` opens a new stream; the test pushes payloads
/// with [`publish`](Self::publish) and ends streams with
/// [`end_streams`](Self::end_streams).
#[derive(Default)]
pub struct ScriptedEventSource {
    senders: Mutex<Vec<mpsc::UnboundedSender<Result<Vec<u8>, GroupError>>>>,
    subscriptions: AtomicUsize,
    filters: Mutex<Vec<BlockFilter>>,
    /// Fail every subscribe call.
    pub fail: std::sync::atomic::AtomicBool,
    /// Delay before each subscribe completes.
    pub delay: Option<Duration>,
}

impl ScriptedEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Number of successful subscribe calls.
    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    pub fn filters(&self) -> Vec<BlockFilter> {
        self.filters.lock().clone()
    }

    /// Push a block payload to every open stream.
    pub fn publish(&self, payload: Vec<u8>) {
        self.senders
            .lock()
            .retain(|tx| tx.send(Ok(payload.clone())).is_ok());
    }

    /// End every open stream.
    pub fn end_streams(&self) {
        self.senders.lock().clear();
    }
}

#[async_trait]
impl EventSource for ScriptedEventSource {
    async fn subscribe(&self, filter: BlockFilter) -> Result<EventStream, GroupError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.filters.lock().push(filter);
        if self.fail.load(Ordering::SeqCst) {
            return Err(GroupError::Subscribe("node unavailable".into()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().push(tx);
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}

/// Encode a block carrying one `EditParaGroups` event per group.
pub fn encode_group_block(groups: &[GroupPayload]) -> Vec<u8> {
    let txs = groups
        .iter()
        .enumerate()
        .map(|(i, group)| FilteredTransaction {
            txid: format!("tx{}", i),
            events: vec![ContractEvent {
                contract: shared_types::PARACHAIN_CONTRACT.into(),
                name: PARACHAIN_GROUP_EVENT.into(),
                body: serde_json_body(group),
            }],
        })
        .collect();
    FilteredBlock {
        txs,
        ..Default::default()
    }
    .encode_to_vec()
}
