//! # Domain Errors

use shared_types::CryptoFamily;
use thiserror::Error;

/// Per-stream authentication failures. All of them reject the stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No peer certificate on the connection.
    #[error("peer certificate missing")]
    CertMissing,

    /// Leaf certificate could not be parsed.
    #[error("peer certificate invalid: {0}")]
    CertInvalid(String),

    /// Leaf serial number is revoked.
    #[error("peer certificate {0} revoked")]
    CertRevoked(String),

    /// Certificate subject carries no address.
    #[error("peer address missing from certificate subject")]
    AddressMissing,

    /// Revocation status could not be determined.
    #[error("revocation store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<AuthError> for tonic::Status {
    fn from(e: AuthError) -> Self {
        tonic::Status::unauthenticated(e.to_string())
    }
}

/// Credential build failures. Fatal at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TlsError {
    /// A material file is missing or unreadable.
    #[error("TLS material {path}: {reason}")]
    Material { path: String, reason: String },

    /// The CA certificate could not be parsed.
    #[error("invalid CA certificate: {0}")]
    InvalidCertificate(String),

    /// No TLS backend for this crypto family.
    #[error("TLS not supported for {0} certificates")]
    UnsupportedCryptoFamily(CryptoFamily),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_maps_to_unauthenticated() {
        let status: tonic::Status = AuthError::CertRevoked("1234".into()).into();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert!(status.message().contains("1234"));
    }
}
