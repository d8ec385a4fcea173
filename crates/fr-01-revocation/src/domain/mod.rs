//! # Domain Module
//!
//! Revocation records and the error types of the subsystem.

pub mod errors;
pub mod record;

pub use errors::*;
pub use record::*;
