//! Certificate material loaded from the TLS directory.

use crate::domain::TlsError;
use shared_types::tls_files;
use std::fs;
use std::path::Path;

/// PEM bytes of the CA certificate, local certificate and key.
#[derive(Clone)]
pub struct TlsMaterial {
    pub ca_cert: Vec<u8>,
    pub cert: Vec<u8>,
    pub key: Vec<u8>,
    /// Derived sub-key, when the CA issued one.
    pub hd_key: Option<Vec<u8>>,
}

impl TlsMaterial {
    /// Read the material files from `dir`.
    pub fn load(dir: &Path) -> Result<Self, TlsError> {
        let read = |name: &str| {
            let path = dir.join(name);
            fs::read(&path).map_err(|e| TlsError::Material {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        };

        Ok(Self {
            ca_cert: read(tls_files::CA_CERT)?,
            cert: read(tls_files::NODE_CERT)?,
            key: read(tls_files::NODE_KEY)?,
            hd_key: fs::read(dir.join(tls_files::HD_KEY)).ok(),
        })
    }
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("ca_cert", &self.ca_cert.len())
            .field("cert", &self.cert.len())
            .field("key", &"<redacted>")
            .field("hd_key", &self.hd_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_names_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(tls_files::CA_CERT), "ca").unwrap();

        match TlsMaterial::load(dir.path()) {
            Err(TlsError::Material { path, .. }) => assert!(path.ends_with(tls_files::NODE_CERT)),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_hd_key_optional() {
        let dir = TempDir::new().unwrap();
        for name in [tls_files::CA_CERT, tls_files::NODE_CERT, tls_files::NODE_KEY] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        let material = TlsMaterial::load(dir.path()).unwrap();
        assert!(material.hd_key.is_none());
        assert_eq!(material.cert, tls_files::NODE_CERT.as_bytes());
    }
}
