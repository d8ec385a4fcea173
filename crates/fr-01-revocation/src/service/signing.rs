//! CA request signing.
//!
//! The signed message is `data || nonce`, where the nonce is the current unix
//! time in seconds as a decimal string. What `data` is depends on the call.

use crate::domain::SignerError;
use crate::ports::CertSigner;
use chrono::Utc;
use shared_types::ca::CaSign;

/// Sign `data` for a CA request using the current time as nonce.
pub fn sign_request(signer: &dyn CertSigner, data: &str) -> Result<CaSign, SignerError> {
    sign_request_with_nonce(signer, data, &Utc::now().timestamp().to_string())
}

/// Sign `data` with an explicit nonce.
pub fn sign_request_with_nonce(
    signer: &dyn CertSigner,
    data: &str,
    nonce: &str,
) -> Result<CaSign, SignerError> {
    let message = format!("{}{}", data, nonce);
    let signature = signer.sign(message.as_bytes())?;
    Ok(CaSign {
        address: signer.address().to_string(),
        public_key: signer.public_key().to_string(),
        sign: hex::encode(signature),
        nonce: nonce.to_string(),
    })
}
