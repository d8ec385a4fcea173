//! # Domain Errors

use shared_types::PayloadError;
use thiserror::Error;

/// Group client errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GroupError {
    /// The pre-execution call did not complete.
    #[error("pre-exec failed: {0}")]
    PreExec(String),

    /// The pre-execution reply carried no contract response.
    #[error("pre-exec returned no contract response")]
    EmptyResponse,

    /// The contract answered with a non-success status that does not degrade.
    #[error("getGroup returned status {status}: {message}")]
    Status { status: i32, message: String },

    /// The returned group is unusable for this partition.
    #[error("invalid group: {0}")]
    InvalidGroup(String),

    /// Opening the event subscription failed.
    #[error("subscribe failed: {0}")]
    Subscribe(String),

    /// The event stream failed mid-flight.
    #[error("event stream error: {0}")]
    Stream(String),

    /// An event payload could not be decoded.
    #[error(transparent)]
    Payload(#[from] PayloadError),
}
