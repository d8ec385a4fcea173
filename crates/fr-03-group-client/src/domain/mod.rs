//! # Domain Module

pub mod errors;
pub mod events;
pub mod membership;
pub mod policy;

pub use errors::*;
pub use events::*;
pub use membership::*;
pub use policy::*;
