//! # FR-02 TLS Authentication
//!
//! Gates every inbound stream behind mutual TLS plus revocation status and
//! hands the caller's address to the handlers.
//!
//! **Subsystem ID:** 2  
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Authentication Steps (per stream)
//!
//! | Step | Check | Failure |
//! |------|-------|---------|
//! | 1 | Peer presented a certificate | `CertMissing` |
//! | 2 | Leaf parses as X.509 | `CertInvalid` |
//! | 3 | Serial not in the revocation store | `CertRevoked` |
//! | 4 | Single-network mode | pass through |
//! | 5 | Subject `serialNumber` holds the peer address | `AddressMissing` |
//!
//! On success the [`PeerIdentity`](shared_types::PeerIdentity) is attached to
//! the request extensions.
//!
//! ## Credentials
//!
//! The CA certificate's signature algorithm selects the credential backend
//! (standard or national). Credentials are built once per authenticator and
//! cached.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{backend_for, NationalBackend, StandardBackend};
pub use domain::{detect_cert_family, AuthError, TlsError, TlsMaterial, ADDRESS_ATTR_OID, SM2_SIGNATURE_OID};
pub use ports::CredentialBackend;
pub use service::{AuthInterceptor, TlsAuthConfig, TlsAuthenticator, TlsCredentials};
