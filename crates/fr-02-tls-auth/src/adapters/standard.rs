//! Standard (ECDSA/RSA) credentials via rustls.

use crate::domain::{TlsError, TlsMaterial};
use crate::ports::CredentialBackend;
use shared_types::CryptoFamily;
use tonic::transport::{Certificate, ClientTlsConfig, Identity, ServerTlsConfig};

/// rustls-backed credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardBackend;

impl CredentialBackend for StandardBackend {
    fn family(&self) -> CryptoFamily {
        CryptoFamily::Standard
    }

    fn server_config(&self, material: &TlsMaterial) -> Result<ServerTlsConfig, TlsError> {
        // client_ca_root makes client certificates mandatory.
        Ok(ServerTlsConfig::new()
            .identity(Identity::from_pem(&material.cert, &material.key))
            .client_ca_root(Certificate::from_pem(&material.ca_cert)))
    }

    fn client_config(&self, material: &TlsMaterial, domain: &str) -> Result<ClientTlsConfig, TlsError> {
        Ok(ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(&material.ca_cert))
            .identity(Identity::from_pem(&material.cert, &material.key))
            .domain_name(domain))
    }
}
