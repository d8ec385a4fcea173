//! # Application Services
//!
//! - [`RevocationSync`]: periodic revocation pull
//! - [`CaOperations`]: enrollment and certificate bootstrap
//! - request signing shared by both

mod operations;
mod signing;
mod sync;

pub use operations::CaOperations;
pub use signing::{sign_request, sign_request_with_nonce};
pub use sync::{delay_until_next_boundary, RevocationSync};
