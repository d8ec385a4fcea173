//! # Ports Module

pub mod credentials;

pub use credentials::*;
