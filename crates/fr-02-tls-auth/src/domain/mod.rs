//! # Domain Module

pub mod certificate;
pub mod errors;
pub mod material;

pub use certificate::*;
pub use errors::*;
pub use material::*;
