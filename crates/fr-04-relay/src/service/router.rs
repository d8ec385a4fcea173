//! # Authorization Router
//!
//! Per-partition membership checks backed by a lazily populated registry of
//! [`GroupClient`]s.
//!
//! ## Registry
//!
//! Each partition maps to a `OnceCell`. The registry lock is held only to
//! fetch or insert the cell; creation runs inside `get_or_try_init`, so
//! concurrent first-touch for one partition creates exactly one client while
//! other partitions proceed independently. A failed creation drops the
//! still-empty cell from the registry, so unknown partition names named by
//! peers do not accumulate, and the next call retries.

use crate::domain::RouterError;
use fr_03_group_client::{GroupClient, GroupClientFactory};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

type ClientCell = Arc<OnceCell<Arc<GroupClient>>>;

/// Decides whether a peer may send into a partition.
pub struct AuthorizationRouter {
    primary_network: Option<String>,
    factory: Arc<dyn GroupClientFactory>,
    clients: Mutex<HashMap<String, ClientCell>>,
}

impl AuthorizationRouter {
    /// `primary_network: None` is single-network mode: every message passes.
    pub fn new(primary_network: Option<String>, factory: Arc<dyn GroupClientFactory>) -> Self {
        Self {
            primary_network,
            factory,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn routing_enabled(&self) -> bool {
        self.primary_network.is_some()
    }

    /// True when messages for `partition` skip the membership check.
    pub fn is_open(&self, partition: &str) -> bool {
        match &self.primary_network {
            None => true,
            Some(primary) => primary == partition,
        }
    }

    /// Allow iff `partition` is the primary network or `peer` belongs to its group.
    pub async fn authorize(&self, partition: &str, peer: &str) -> Result<(), RouterError> {
        if self.is_open(partition) {
            return Ok(());
        }
        if partition.is_empty() {
            return Err(RouterError::Denied {
                partition: String::new(),
                peer: peer.to_string(),
            });
        }

        let client = self.client_for(partition).await?;
        let group = client.get().await;
        if group.contains(peer) {
            debug!(partition, peer, "[fr-04] Peer authorized");
            Ok(())
        } else {
            info!(partition, peer, members = group.len(), "[fr-04] Peer not in group");
            Err(RouterError::Denied {
                partition: partition.to_string(),
                peer: peer.to_string(),
            })
        }
    }

    async fn client_for(&self, partition: &str) -> Result<Arc<GroupClient>, RouterError> {
        let cell = self
            .clients
            .lock()
            .entry(partition.to_string())
            .or_default()
            .clone();

        let created = cell
            .get_or_try_init(|| async {
                info!(partition, "[fr-04] Creating group client");
                self.factory.create(partition).await
            })
            .await
            .cloned();

        created.map_err(|e| {
            warn!(partition, "[fr-04] Group client creation failed: {}", e);
            self.evict_empty(partition, &cell);
            RouterError::GroupUnavailable {
                partition: partition.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Remove `cell` if it is still the registered, uninitialized cell.
    fn evict_empty(&self, partition: &str, cell: &ClientCell) {
        let mut clients = self.clients.lock();
        let stale = clients
            .get(partition)
            .is_some_and(|current| Arc::ptr_eq(current, cell) && !current.initialized());
        if stale {
            clients.remove(partition);
        }
    }

    /// Partitions with an initialized client.
    pub fn partitions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .clients
            .lock()
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}
