//! # FR-01 Revocation
//!
//! Keeps the local revocation table eventually consistent with the CA's
//! revocation ledger, and carries the CA client used by the rest of the
//! gateway.
//!
//! **Subsystem ID:** 1  
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`RevocationStore`] | Append-only serial -> record table |
//! | [`CertSigner`] | Signs CA requests with the local node key |
//! | [`CaClient`] | CA RPC (enroll, current cert, revocation list) |
//! | [`RevocationSync`] | Periodic pull of new revocations, aligned to wall-clock boundaries |
//! | [`CaOperations`] | Operator actions and certificate bootstrap |
//!
//! ## Invariants
//!
//! - A serial number appears at most once in the store.
//! - Records are never updated or deleted.
//! - A sync cycle never aborts on a single bad record; a CA outage is retried
//!   on the next cycle.
//!
//! ## Module Structure
//!
//! ```text
//! fr-01-revocation/
//! ├── domain/     # RevocationRecord, SyncReport, errors
//! ├── ports/      # RevocationStore, CaClient, CertSigner (+ mocks)
//! ├── adapters/   # memory/RocksDB store, gRPC CA client, key-file signer
//! └── service/    # RevocationSync, CaOperations, request signing
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{
    detect_key_family, load_signer, GrpcCaClient, InMemoryRevocationStore, KeyFileSigner,
};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbRevocationStore, RocksDbStoreConfig};
pub use domain::{
    CaError, RevocationError, RevocationRecord, SignerError, StoreError, SyncReport,
    DEFAULT_SYNC_PERIOD,
};
pub use ports::{CaClient, CertSigner, MockCaClient, RevocationStore, StaticSigner};
pub use service::{
    delay_until_next_boundary, sign_request, sign_request_with_nonce, CaOperations,
    RevocationSync,
};
