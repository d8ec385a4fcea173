//! # Credential Backend Port
//!
//! Builds transport credentials from certificate material. One
//! implementation per crypto family; the family is chosen once from the CA
//! certificate.

use crate::domain::{TlsError, TlsMaterial};
use shared_types::CryptoFamily;
use tonic::transport::{ClientTlsConfig, ServerTlsConfig};

/// Transport credential builder for one crypto family.
pub trait CredentialBackend: Send + Sync {
    /// Family this backend handles.
    fn family(&self) -> CryptoFamily;

    /// Server credentials requiring and verifying a client certificate.
    fn server_config(&self, material: &TlsMaterial) -> Result<ServerTlsConfig, TlsError>;

    /// Client credentials presenting the local certificate to `domain`.
    fn client_config(&self, material: &TlsMaterial, domain: &str) -> Result<ClientTlsConfig, TlsError>;
}
