//! # Domain Errors

use shared_types::CryptoFamily;
use thiserror::Error;

/// Revocation store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A record with this serial number already exists.
    #[error("serial {0} already revoked")]
    Duplicate(String),

    /// The backing store failed.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Codec(String),
}

/// Local signing key errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    /// A key file is missing or unreadable.
    #[error("key file {path}: {reason}")]
    KeyFile { path: String, reason: String },

    /// Key material could not be parsed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// No signer is available for this key family.
    #[error("unsupported key family: {0}")]
    UnsupportedFamily(CryptoFamily),
}

/// CA RPC errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaError {
    /// Could not reach the CA.
    #[error("CA unreachable at {host}: {reason}")]
    Connect { host: String, reason: String },

    /// The CA rejected or failed the call.
    #[error("CA call {method} failed: {reason}")]
    Rpc { method: &'static str, reason: String },
}

/// Errors surfaced by the revocation services.
#[derive(Debug, Error)]
pub enum RevocationError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Ca(#[from] CaError),

    /// Writing certificate material failed.
    #[error("write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
