//! # Error Types

use thiserror::Error;

/// Errors decoding payloads carried inside wire messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// Membership group body is not valid JSON.
    #[error("invalid group payload: {0}")]
    InvalidGroup(String),

    /// Protobuf body could not be decoded.
    #[error("invalid protobuf payload: {0}")]
    Decode(String),
}

impl From<prost::DecodeError> for PayloadError {
    fn from(e: prost::DecodeError) -> Self {
        PayloadError::Decode(e.to_string())
    }
}
