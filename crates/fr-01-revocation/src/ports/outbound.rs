//! # Outbound Ports
//!
//! The revocation table, the CA RPC surface and the local signing key.

use crate::domain::{CaError, RevocationRecord, SignerError, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::ca::{
    CurrentCertRequest, CurrentCertResponse, EnrollNodeRequest, EnrollNodeResponse, RevokeListRequest,
    RevokeListResponse, RevokeNode,
};

/// Append-only revocation table.
///
/// Consulted synchronously on every new inbound stream, so implementations
/// must answer `lookup` without blocking on network I/O.
pub trait RevocationStore: Send + Sync {
    /// Find the record for a certificate serial number.
    fn lookup(&self, serial: &str) -> Result<Option<RevocationRecord>, StoreError>;

    /// Append a record, returning its id.
    ///
    /// Fails with [`StoreError::Duplicate`] if the serial is already present.
    fn insert(&self, record: RevocationRecord) -> Result<u64, StoreError>;

    /// Serial number of the highest-id record for `partition`.
    fn latest_serial(&self, partition: &str) -> Result<Option<String>, StoreError>;
}

/// CA RPC client.
#[async_trait]
pub trait CaClient: Send + Sync {
    /// Register a node address under a network.
    async fn enroll_node(&self, request: EnrollNodeRequest) -> Result<EnrollNodeResponse, CaError>;

    /// Fetch this node's current certificate bundle.
    async fn current_cert(&self, request: CurrentCertRequest) -> Result<CurrentCertResponse, CaError>;

    /// Fetch revocations newer than `request.serial_num`.
    async fn revoke_list(&self, request: RevokeListRequest) -> Result<RevokeListResponse, CaError>;
}

/// Signs CA requests with the local node key.
pub trait CertSigner: Send + Sync {
    /// Address derived from the local key.
    fn address(&self) -> &str;

    /// Public key in the form the CA expects.
    fn public_key(&self) -> &str;

    /// Sign `message`, returning the DER-encoded signature.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Scripted CA for tests.
#[derive(Default)]
pub struct MockCaClient {
    /// Revocation ledger served by `revoke_list` (entries after the requested serial).
    pub revocations: Mutex<Vec<RevokeNode>>,
    /// Certificate bundle served by `current_cert`.
    pub cert: Mutex<CurrentCertResponse>,
    /// Every revocation-list request received.
    pub revoke_requests: Mutex<Vec<RevokeListRequest>>,
    /// Every enrollment request received.
    pub enroll_requests: Mutex<Vec<EnrollNodeRequest>>,
    /// Fail every call.
    pub unreachable: bool,
}

impl MockCaClient {
    pub fn with_revocations(revocations: Vec<RevokeNode>) -> Self {
        Self {
            revocations: Mutex::new(revocations),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), CaError> {
        if self.unreachable {
            return Err(CaError::Connect {
                host: "mock".into(),
                reason: "connection refused".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CaClient for MockCaClient {
    async fn enroll_node(&self, request: EnrollNodeRequest) -> Result<EnrollNodeResponse, CaError> {
        self.check()?;
        self.enroll_requests.lock().push(request);
        Ok(EnrollNodeResponse {
            log_id: "mock".into(),
        })
    }

    async fn current_cert(&self, _request: CurrentCertRequest) -> Result<CurrentCertResponse, CaError> {
        self.check()?;
        Ok(self.cert.lock().clone())
    }

    async fn revoke_list(&self, request: RevokeListRequest) -> Result<RevokeListResponse, CaError> {
        self.check()?;
        let all = self.revocations.lock().clone();
        let start = all
            .iter()
            .position(|n| n.serial_num == request.serial_num)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.revoke_requests.lock().push(request);
        Ok(RevokeListResponse {
            list: all[start..].to_vec(),
        })
    }
}

/// Signer with a fixed identity that "signs" by echoing the message.
#[derive(Debug, Clone)]
pub struct StaticSigner {
    pub address: String,
    pub public_key: String,
}

impl StaticSigner {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            public_key: "{}".into(),
        }
    }
}

impl CertSigner for StaticSigner {
    fn address(&self) -> &str {
        &self.address
    }

    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(message.to_vec())
    }
}
