//! # Revocation Sync
//!
//! Pulls revocations newer than the latest locally known serial and appends
//! them to the store. Runs once immediately, then at every aligned period
//! boundary of wall-clock time (default every ten minutes: :00, :10, ...).

use crate::domain::{RevocationError, RevocationRecord, StoreError, SyncReport, DEFAULT_SYNC_PERIOD};
use crate::ports::{CaClient, CertSigner, RevocationStore};
use crate::service::signing::sign_request;
use chrono::{DateTime, Utc};
use shared_types::ca::RevokeListRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Periodic revocation sync job.
pub struct RevocationSync {
    store: Arc<dyn RevocationStore>,
    ca: Arc<dyn CaClient>,
    signer: Arc<dyn CertSigner>,
    period: Duration,
}

impl RevocationSync {
    pub fn new(
        store: Arc<dyn RevocationStore>,
        ca: Arc<dyn CaClient>,
        signer: Arc<dyn CertSigner>,
    ) -> Self {
        Self {
            store,
            ca,
            signer,
            period: DEFAULT_SYNC_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Run one sync cycle for `partition`.
    ///
    /// Records already present are skipped, so repeating a cycle never
    /// creates duplicates. A record that fails to check or insert is logged
    /// and counted; it does not abort the batch.
    pub async fn sync_once(&self, partition: &str) -> Result<SyncReport, RevocationError> {
        let since = match self.store.latest_serial(partition) {
            Ok(serial) => serial.unwrap_or_default(),
            Err(e) => {
                warn!("[fr-01] Cannot read latest serial, syncing from start: {}", e);
                String::new()
            }
        };

        let sign = sign_request(self.signer.as_ref(), &format!("{}{}", since, partition))?;
        let response = self
            .ca
            .revoke_list(RevokeListRequest {
                sign: Some(sign),
                net: partition.to_string(),
                serial_num: since.clone(),
            })
            .await?;

        let mut report = SyncReport {
            fetched: response.list.len(),
            ..SyncReport::default()
        };

        for node in &response.list {
            match self.store.lookup(&node.serial_num) {
                Ok(Some(_)) => {
                    report.skipped += 1;
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(serial = %node.serial_num, "[fr-01] Revocation lookup failed: {}", e);
                    report.failed += 1;
                    continue;
                }
            }

            match self.store.insert(RevocationRecord::from_ca(node, partition)) {
                Ok(_) => report.inserted += 1,
                Err(StoreError::Duplicate(_)) => report.skipped += 1,
                Err(e) => {
                    warn!(id = node.id, serial = %node.serial_num, "[fr-01] Revocation insert failed: {}", e);
                    report.failed += 1;
                }
            }
        }

        info!(
            partition = %partition,
            since = %since,
            fetched = report.fetched,
            inserted = report.inserted,
            skipped = report.skipped,
            failed = report.failed,
            "[fr-01] Revocation sync complete"
        );
        Ok(report)
    }

    /// Sync now, then at every period boundary, until the task is dropped.
    pub async fn run_forever(self: Arc<Self>, partition: String) {
        loop {
            if let Err(e) = self.sync_once(&partition).await {
                warn!(partition = %partition, "[fr-01] Revocation sync failed: {}", e);
            }
            let delay = delay_until_next_boundary(Utc::now(), self.period);
            debug!("[fr-01] Next revocation sync in {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }

    /// Spawn [`run_forever`](Self::run_forever) as a background task.
    pub fn spawn(self: Arc<Self>, partition: String) -> JoinHandle<()> {
        tokio::spawn(self.run_forever(partition))
    }
}

/// Time from `now` to the next multiple of `period` since the unix epoch.
///
/// A `now` exactly on a boundary waits a full period.
pub fn delay_until_next_boundary(now: DateTime<Utc>, period: Duration) -> Duration {
    let period_ms = (period.as_millis() as i64).max(1);
    let now_ms = now.timestamp_millis();
    let next = (now_ms.div_euclid(period_ms) + 1) * period_ms;
    Duration::from_millis((next - now_ms) as u64)
}
