//! # Domain Entities
//!
//! Identity and membership types shared by the authentication, authorization
//! and group-cache subsystems.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::errors::PayloadError;

/// Kernel module hosting the parachain contract on the backend node.
pub const PARACHAIN_MODULE: &str = "xkernel";
/// Parachain kernel contract name.
pub const PARACHAIN_CONTRACT: &str = "$parachain";
/// Contract method returning the membership group of one parachain.
pub const PARACHAIN_GET_GROUP: &str = "getGroup";
/// Event emitted on the primary network whenever a parachain group changes.
pub const PARACHAIN_GROUP_EVENT: &str = "EditParaGroups";

/// Certificate material file names inside the TLS directory.
pub mod tls_files {
    /// CA certificate (PEM).
    pub const CA_CERT: &str = "cacert.pem";
    /// Local node certificate (PEM).
    pub const NODE_CERT: &str = "cert.pem";
    /// Local node private key (PEM).
    pub const NODE_KEY: &str = "private.key";
    /// Optional derived sub-key issued alongside the certificate.
    pub const HD_KEY: &str = "hd_private.key";
}

/// Cryptographic family of a key or certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CryptoFamily {
    /// NIST / secp256k1 ECDSA.
    Standard,
    /// SM2 national curve.
    National,
}

impl fmt::Display for CryptoFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoFamily::Standard => f.write_str("standard"),
            CryptoFamily::National => f.write_str("national"),
        }
    }
}

/// Address of an authenticated peer, taken from its certificate subject.
///
/// Derived once per accepted stream and attached to the request; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerIdentity(String);

impl PeerIdentity {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn address(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Membership group as serialized by the parachain contract, both in the
/// `getGroup` response body and in `EditParaGroups` event bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPayload {
    /// Parachain name.
    #[serde(rename = "name", default, skip_serializing_if = "String::is_empty")]
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admin: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<String>,
}

impl GroupPayload {
    /// Parse a JSON body.
    pub fn from_json(body: &[u8]) -> Result<Self, PayloadError> {
        serde_json::from_slice(body).map_err(|e| PayloadError::InvalidGroup(e.to_string()))
    }

    /// De-duplicated union of admins and members.
    pub fn addresses(&self) -> BTreeSet<String> {
        self.admin
            .iter()
            .chain(self.identities.iter())
            .cloned()
            .collect()
    }
}
