//! # Domain Errors

use thiserror::Error;
use tonic::Status;

/// Authorization failures. All of them reject the stream without relaying.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouterError {
    /// Partition routing is on but the stream carries no peer identity.
    #[error("peer identity missing")]
    PeerMissing,

    /// The peer is not a member of the partition.
    #[error("peer {peer} not authorized for {partition}")]
    Denied { partition: String, peer: String },

    /// The partition's membership could not be loaded.
    #[error("membership for {partition} unavailable: {reason}")]
    GroupUnavailable { partition: String, reason: String },
}

impl From<RouterError> for Status {
    fn from(e: RouterError) -> Self {
        match e {
            RouterError::PeerMissing => Status::unauthenticated(e.to_string()),
            _ => Status::permission_denied(e.to_string()),
        }
    }
}

/// Relay failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Could not build a connection to the node.
    #[error("node connect failed: {0}")]
    Connect(String),

    /// The node did not answer within the RPC timeout.
    #[error("node call timed out")]
    Timeout,

    /// The call to the node failed.
    #[error("node transport error: {0}")]
    Transport(String),

    /// The reply stream ended without a message.
    #[error("no response from node")]
    NoResponse,
}

impl From<RelayError> for Status {
    fn from(e: RelayError) -> Self {
        Status::unavailable(e.to_string())
    }
}
