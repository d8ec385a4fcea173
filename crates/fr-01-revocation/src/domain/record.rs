//! # Revocation Records

use serde::{Deserialize, Serialize};
use shared_types::ca::RevokeNode;
use std::time::Duration;

/// Revocation sync cycle; each cycle starts on a multiple of this period.
pub const DEFAULT_SYNC_PERIOD: Duration = Duration::from_secs(600);

/// A certificate serial number the CA no longer trusts.
///
/// Unique on `serial_number`. Created by the sync job, never updated, never
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    /// CA-assigned ledger id; ordering key for `latest_serial`.
    pub id: u64,
    /// Certificate serial number, decimal.
    pub serial_number: String,
    /// Network the certificate was issued for.
    pub partition: String,
    /// Revocation time, unix seconds.
    pub revoked_at: i64,
}

impl RevocationRecord {
    pub fn new(
        id: u64,
        serial_number: impl Into<String>,
        partition: impl Into<String>,
        revoked_at: i64,
    ) -> Self {
        Self {
            id,
            serial_number: serial_number.into(),
            partition: partition.into(),
            revoked_at,
        }
    }

    /// Build a record from a CA ledger entry.
    pub fn from_ca(node: &RevokeNode, partition: &str) -> Self {
        Self {
            id: u64::try_from(node.id).unwrap_or_default(),
            serial_number: node.serial_num.clone(),
            partition: partition.to_string(),
            revoked_at: node.create_time,
        }
    }
}

/// Outcome of one sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records returned by the CA.
    pub fetched: usize,
    /// Records newly written.
    pub inserted: usize,
    /// Records already present locally.
    pub skipped: usize,
    /// Records that could not be checked or written.
    pub failed: usize,
}
