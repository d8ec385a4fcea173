//! # Key-File Signer
//!
//! Loads the local node account from the keys directory:
//!
//! - `address` - account address, plain text
//! - `public.key` - JSON public key; its `Curvname` selects the key family
//! - `private.key` - JSON with the secret scalar `D` as a decimal integer,
//!   or a bare hex scalar
//!
//! Only the standard family has a signer. National (SM2) keys are detected
//! and rejected with [`SignerError::UnsupportedFamily`].

use crate::domain::SignerError;
use crate::ports::CertSigner;
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use primitive_types::U256;
use serde::Deserialize;
use serde_json::value::RawValue;
use shared_types::CryptoFamily;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const ADDRESS_FILE: &str = "address";
const PUBLIC_KEY_FILE: &str = "public.key";
const PRIVATE_KEY_FILE: &str = "private.key";

#[derive(Deserialize)]
struct PublicKeyJson {
    #[serde(rename = "Curvname", alias = "curve", default)]
    curve: String,
}

#[derive(Deserialize)]
struct PrivateKeyJson<'a> {
    // Kept raw: the scalar does not fit in a JSON f64.
    #[serde(rename = "D", borrow)]
    d: &'a RawValue,
}

/// Decode the `D` literal: a JSON number is decimal, a JSON string is hex.
fn decode_scalar(literal: &str) -> Result<[u8; 32], SignerError> {
    let mut secret = [0u8; 32];
    if let Some(quoted) = literal.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        let bytes = hex::decode(quoted.trim_start_matches("0x"))
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        if bytes.len() != secret.len() {
            return Err(SignerError::InvalidKey(format!(
                "secret scalar is {} bytes",
                bytes.len()
            )));
        }
        secret.copy_from_slice(&bytes);
    } else {
        let scalar = U256::from_dec_str(literal)
            .map_err(|e| SignerError::InvalidKey(format!("D: {:?}", e)))?;
        scalar.to_big_endian(&mut secret);
    }
    Ok(secret)
}

fn read_key_file(dir: &Path, name: &str) -> Result<String, SignerError> {
    let path = dir.join(name);
    fs::read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| SignerError::KeyFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Detect the family of the local key from `public.key`.
pub fn detect_key_family(keys_dir: &Path) -> Result<CryptoFamily, SignerError> {
    let raw = read_key_file(keys_dir, PUBLIC_KEY_FILE)?;
    let key: PublicKeyJson =
        serde_json::from_str(&raw).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
    if key.curve.to_lowercase().contains("sm") {
        Ok(CryptoFamily::National)
    } else {
        Ok(CryptoFamily::Standard)
    }
}

/// Build the signer for the key in `keys_dir`, selecting by key family.
///
/// The family is read once here; callers keep the returned signer.
pub fn load_signer(keys_dir: &Path) -> Result<Arc<dyn CertSigner>, SignerError> {
    match detect_key_family(keys_dir)? {
        CryptoFamily::Standard => Ok(Arc::new(KeyFileSigner::load(keys_dir)?)),
        family => Err(SignerError::UnsupportedFamily(family)),
    }
}

/// NIST P-256 ECDSA signer over SHA-256.
pub struct KeyFileSigner {
    address: String,
    public_key: String,
    key: SigningKey,
}

impl KeyFileSigner {
    /// Load the account from `keys_dir`.
    pub fn load(keys_dir: &Path) -> Result<Self, SignerError> {
        let address = read_key_file(keys_dir, ADDRESS_FILE)?;
        let public_key = read_key_file(keys_dir, PUBLIC_KEY_FILE)?;
        let raw = read_key_file(keys_dir, PRIVATE_KEY_FILE)?;

        let secret = if raw.starts_with('{') {
            let key: PrivateKeyJson<'_> =
                serde_json::from_str(&raw).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
            decode_scalar(key.d.get())?
        } else {
            decode_scalar(&format!("\"{}\"", raw))?
        };

        Self::from_secret(address, public_key, &secret)
    }

    /// Build from an in-memory secret scalar.
    pub fn from_secret(
        address: impl Into<String>,
        public_key: impl Into<String>,
        secret: &[u8],
    ) -> Result<Self, SignerError> {
        let key = SigningKey::from_slice(secret).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Ok(Self {
            address: address.into(),
            public_key: public_key.into(),
            key,
        })
    }
}

impl CertSigner for KeyFileSigner {
    fn address(&self) -> &str {
        &self.address
    }

    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let signature: Signature = self.key.sign(message);
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::{signature::Verifier, VerifyingKey};
    use tempfile::TempDir;

    const SECRET: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const SECRET_DECIMAL: &str =
        "34390819888240390953029010971248455142986221947941601700148038000926730363672";

    fn verifies(signer: &KeyFileSigner) -> bool {
        let der = signer.sign(b"hello").unwrap();
        let signature = Signature::from_der(&der).unwrap();
        VerifyingKey::from(&signer.key).verify(b"hello", &signature).is_ok()
    }

    fn write_keys(curve: &str, private: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(ADDRESS_FILE), "dpzuVdosQrF2kmzumhVeFQZa1aYcdgFpN\n").unwrap();
        fs::write(
            dir.path().join(PUBLIC_KEY_FILE),
            format!(r#"{{"Curvname":"{}","X":1,"Y":2}}"#, curve),
        )
        .unwrap();
        fs::write(dir.path().join(PRIVATE_KEY_FILE), private).unwrap();
        dir
    }

    #[test]
    fn test_detect_family() {
        let dir = write_keys("P-256", SECRET);
        assert_eq!(detect_key_family(dir.path()).unwrap(), CryptoFamily::Standard);

        let dir = write_keys("SM2-P-256", SECRET);
        assert_eq!(detect_key_family(dir.path()).unwrap(), CryptoFamily::National);
    }

    #[test]
    fn test_national_key_has_no_signer() {
        let dir = write_keys("SM2-P-256", SECRET);
        assert!(matches!(
            load_signer(dir.path()),
            Err(SignerError::UnsupportedFamily(CryptoFamily::National))
        ));
    }

    #[test]
    fn test_numeric_d_loads_and_verifies() {
        let private = format!(
            r#"{{"Curvname":"P-256","X":1,"Y":2,"D":{}}}"#,
            SECRET_DECIMAL
        );
        let dir = write_keys("P-256", &private);
        let signer = KeyFileSigner::load(dir.path()).unwrap();
        assert_eq!(signer.address(), "dpzuVdosQrF2kmzumhVeFQZa1aYcdgFpN");

        let from_hex = KeyFileSigner::from_secret("a", "b", &hex::decode(SECRET).unwrap()).unwrap();
        assert_eq!(signer.key.to_bytes(), from_hex.key.to_bytes());
        assert!(verifies(&signer));
    }

    #[test]
    fn test_hex_fallbacks() {
        let dir = write_keys("P-256", &format!(r#"{{"D":"{}"}}"#, SECRET));
        assert!(verifies(&KeyFileSigner::load(dir.path()).unwrap()));

        let dir = write_keys("P-256", SECRET);
        assert!(verifies(&KeyFileSigner::load(dir.path()).unwrap()));
    }

    #[test]
    fn test_bad_scalar_rejected() {
        let dir = write_keys("P-256", r#"{"D":12x}"#);
        assert!(matches!(
            KeyFileSigner::load(dir.path()),
            Err(SignerError::InvalidKey(_))
        ));

        let dir = write_keys("P-256", r#"{"D":"abcd"}"#);
        assert!(matches!(
            KeyFileSigner::load(dir.path()),
            Err(SignerError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_missing_key_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            detect_key_family(dir.path()),
            Err(SignerError::KeyFile { .. })
        ));
    }
}
