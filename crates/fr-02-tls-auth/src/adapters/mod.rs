//! # Adapters Layer
//!
//! Credential backends and the factory that selects one.

mod national;
mod standard;

pub use national::NationalBackend;
pub use standard::StandardBackend;

use crate::ports::CredentialBackend;
use shared_types::CryptoFamily;

/// Backend for a crypto family.
pub fn backend_for(family: CryptoFamily) -> Box<dyn CredentialBackend> {
    match family {
        CryptoFamily::Standard => Box::new(StandardBackend),
        CryptoFamily::National => Box::new(NationalBackend),
    }
}
