//! National (SM2) credentials.
//!
//! rustls has no GM/T TLS cipher suites, so this backend only reports the
//! family as unsupported. Deployments on SM2 certificates need a TLS
//! terminator in front of the gateway.

use crate::domain::{TlsError, TlsMaterial};
use crate::ports::CredentialBackend;
use shared_types::CryptoFamily;
use tonic::transport::{ClientTlsConfig, ServerTlsConfig};

#[derive(Debug, Clone, Copy, Default)]
pub struct NationalBackend;

impl CredentialBackend for NationalBackend {
    fn family(&self) -> CryptoFamily {
        CryptoFamily::National
    }

    fn server_config(&self, _material: &TlsMaterial) -> Result<ServerTlsConfig, TlsError> {
        Err(TlsError::UnsupportedCryptoFamily(CryptoFamily::National))
    }

    fn client_config(&self, _material: &TlsMaterial, _domain: &str) -> Result<ClientTlsConfig, TlsError> {
        Err(TlsError::UnsupportedCryptoFamily(CryptoFamily::National))
    }
}
