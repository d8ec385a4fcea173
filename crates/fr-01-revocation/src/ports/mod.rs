//! # Ports Module
//!
//! Outbound dependencies of the revocation subsystem.

pub mod outbound;

pub use outbound::*;
