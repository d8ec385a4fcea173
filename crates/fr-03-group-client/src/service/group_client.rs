//! # Group Client
//!
//! One instance per partition. Owns the membership snapshot and at most one
//! live event subscription.

use crate::domain::{extract_group_update, DegradePolicy, GroupError, MembershipGroup, STATUS_SUCCESS};
use crate::ports::{ChainReader, EventSource, EventStream};
use futures::StreamExt;
use parking_lot::RwLock;
use shared_types::node::{BlockFilter, InvokeRequest, InvokeRpcRequest, RpcHeader};
use shared_types::{
    GroupPayload, PARACHAIN_CONTRACT, PARACHAIN_GET_GROUP, PARACHAIN_GROUP_EVENT, PARACHAIN_MODULE,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Group client settings.
#[derive(Debug, Clone)]
pub struct GroupClientConfig {
    /// Partition (parachain name) this client serves.
    pub partition: String,
    /// Primary network; group reads and membership events live there.
    pub primary_network: String,
    /// Local node address, sent as initiator of the pre-execution.
    pub initiator: String,
    pub degrade_policy: DegradePolicy,
    /// Pause after each applied update; zero disables.
    pub event_throttle: Duration,
    /// Bound on opening the event stream. Callers of [`GroupClient::get`]
    /// wait at most this long before falling back to the snapshot.
    pub subscribe_timeout: Duration,
}

/// State shared with the listener task.
struct Shared {
    partition: String,
    snapshot: RwLock<Arc<MembershipGroup>>,
    live: AtomicBool,
}

impl Shared {
    fn replace(&self, group: MembershipGroup) {
        *self.snapshot.write() = Arc::new(group);
    }
}

/// Per-partition membership cache with a self-healing subscription.
pub struct GroupClient {
    config: GroupClientConfig,
    reader: Arc<dyn ChainReader>,
    events: Arc<dyn EventSource>,
    shared: Arc<Shared>,
    subscribe_gate: Mutex<()>,
    shutdown: watch::Receiver<bool>,
}

impl GroupClient {
    /// Create an uninitialized client with an empty snapshot.
    ///
    /// Listener tasks exit once `shutdown` turns `true` or its sender is
    /// dropped.
    pub fn new(
        config: GroupClientConfig,
        reader: Arc<dyn ChainReader>,
        events: Arc<dyn EventSource>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let shared = Arc::new(Shared {
            partition: config.partition.clone(),
            snapshot: RwLock::new(Arc::new(MembershipGroup::empty(&config.partition))),
            live: AtomicBool::new(false),
        });
        Self {
            config,
            reader,
            events,
            shared,
            subscribe_gate: Mutex::new(()),
            shutdown,
        }
    }

    pub fn partition(&self) -> &str {
        &self.config.partition
    }

    /// Seed the snapshot from the chain, then subscribe.
    ///
    /// A degrading status (see [`DegradePolicy`]) leaves the snapshot empty.
    /// A subscribe failure here is logged only; the next [`get`](Self::get)
    /// retries it.
    pub async fn init(&self) -> Result<(), GroupError> {
        let response = self.reader.pre_exec(self.group_request()).await?;
        let contract = response
            .response
            .and_then(|r| r.responses.into_iter().next())
            .ok_or(GroupError::EmptyResponse)?;

        if contract.status == STATUS_SUCCESS {
            let payload = GroupPayload::from_json(&contract.body)?;
            let group = MembershipGroup::from_initial(&self.config.partition, &payload)?;
            info!(
                partition = %self.config.partition,
                members = group.len(),
                "[fr-03] Group loaded"
            );
            self.shared.replace(group);
        } else if self.config.degrade_policy.degrades(contract.status) {
            warn!(
                partition = %self.config.partition,
                status = contract.status,
                "[fr-03] Group read refused, starting empty until a membership event arrives"
            );
            self.shared
                .replace(MembershipGroup::empty(&self.config.partition));
        } else {
            return Err(GroupError::Status {
                status: contract.status,
                message: contract.message,
            });
        }

        if let Err(e) = self.ensure_subscribed().await {
            warn!(partition = %self.config.partition, "[fr-03] Initial subscribe failed: {}", e);
        }
        Ok(())
    }

    /// Most recent membership, after making sure a subscription is live.
    ///
    /// Never fails: if resubscribing fails, the last known (possibly stale)
    /// snapshot is returned.
    pub async fn get(&self) -> Arc<MembershipGroup> {
        if let Err(e) = self.ensure_subscribed().await {
            warn!(partition = %self.config.partition, "[fr-03] Resubscribe failed: {}", e);
        }
        self.snapshot()
    }

    /// Current snapshot without touching the subscription.
    pub fn snapshot(&self) -> Arc<MembershipGroup> {
        self.shared.snapshot.read().clone()
    }

    /// Whether a listener task currently owns a live stream.
    pub fn is_subscribed(&self) -> bool {
        self.shared.live.load(Ordering::Acquire)
    }

    /// Open the event subscription unless one is live.
    ///
    /// Concurrent callers are serialized on a gate and re-check the flag, so
    /// at most one subscription is created. Returns `true` if this call
    /// opened it.
    pub async fn ensure_subscribed(&self) -> Result<bool, GroupError> {
        if self.is_subscribed() {
            return Ok(false);
        }
        let _gate = self.subscribe_gate.lock().await;
        if self.is_subscribed() {
            return Ok(false);
        }

        let stream = tokio::time::timeout(
            self.config.subscribe_timeout,
            self.events.subscribe(self.event_filter()),
        )
        .await
        .map_err(|_| {
            GroupError::Subscribe(format!(
                "no stream within {:?}",
                self.config.subscribe_timeout
            ))
        })??;
        self.shared.live.store(true, Ordering::Release);
        tokio::spawn(listen(
            self.shared.clone(),
            stream,
            self.config.event_throttle,
            self.shutdown.clone(),
        ));
        info!(partition = %self.config.partition, "[fr-03] Subscribed to membership events");
        Ok(true)
    }

    fn group_request(&self) -> InvokeRpcRequest {
        let mut args = HashMap::new();
        args.insert("name".to_string(), self.config.partition.as_bytes().to_vec());
        InvokeRpcRequest {
            header: Some(RpcHeader {
                log_id: uuid::Uuid::new_v4().simple().to_string(),
                ..Default::default()
            }),
            bcname: self.config.primary_network.clone(),
            requests: vec![InvokeRequest {
                module_name: PARACHAIN_MODULE.into(),
                contract_name: PARACHAIN_CONTRACT.into(),
                method_name: PARACHAIN_GET_GROUP.into(),
                args,
            }],
            initiator: self.config.initiator.clone(),
            auth_require: vec![self.config.initiator.clone()],
        }
    }

    fn event_filter(&self) -> BlockFilter {
        BlockFilter {
            bcname: self.config.primary_network.clone(),
            event_name: PARACHAIN_GROUP_EVENT.into(),
            ..Default::default()
        }
    }
}

/// Listener loop: apply updates until the stream ends, fails or shutdown.
async fn listen(
    shared: Arc<Shared>,
    mut stream: EventStream,
    throttle: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    debug!(partition = %shared.partition, "[fr-03] Listener shutting down");
                    break;
                }
            }
            next = stream.next() => match next {
                Some(Ok(payload)) => match extract_group_update(&payload, &shared.partition) {
                    Ok(Some(payload)) => {
                        let group = MembershipGroup::from_payload(&shared.partition, &payload);
                        info!(
                            partition = %shared.partition,
                            members = group.len(),
                            "[fr-03] Membership replaced"
                        );
                        shared.replace(group);
                        if !throttle.is_zero() {
                            tokio::time::sleep(throttle).await;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(partition = %shared.partition, "[fr-03] Discarding event: {}", e),
                },
                Some(Err(e)) => {
                    warn!(partition = %shared.partition, "[fr-03] Event stream failed: {}", e);
                    break;
                }
                None => {
                    info!(partition = %shared.partition, "[fr-03] Event stream ended");
                    break;
                }
            }
        }
    }
    shared.live.store(false, Ordering::Release);
}
