//! # TLS Authenticator
//!
//! Owns the credential cache and the per-stream authentication decision.

use crate::adapters::backend_for;
use crate::domain::{detect_cert_family, parse_leaf, AuthError, TlsError, TlsMaterial};
use fr_01_revocation::RevocationStore;
use parking_lot::Mutex;
use shared_types::{CryptoFamily, PeerIdentity};
use std::path::PathBuf;
use std::sync::Arc;
use tonic::transport::{ClientTlsConfig, ServerTlsConfig};
use tracing::{debug, info, warn};

/// Authenticator configuration.
#[derive(Debug, Clone)]
pub struct TlsAuthConfig {
    /// Directory holding the certificate material.
    pub tls_dir: PathBuf,
    /// Server name expected on outbound TLS connections.
    pub domain_name: String,
    /// Partition routing is on; peer addresses must be extracted.
    pub routing_enabled: bool,
}

/// Transport credentials for the server and outbound connections.
#[derive(Debug, Clone)]
pub struct TlsCredentials {
    pub family: CryptoFamily,
    pub server: ServerTlsConfig,
    pub client: ClientTlsConfig,
}

/// Builds credentials and authenticates inbound streams.
pub struct TlsAuthenticator {
    config: TlsAuthConfig,
    store: Arc<dyn RevocationStore>,
    credentials: Mutex<Option<Arc<TlsCredentials>>>,
}

impl TlsAuthenticator {
    pub fn new(config: TlsAuthConfig, store: Arc<dyn RevocationStore>) -> Self {
        Self {
            config,
            store,
            credentials: Mutex::new(None),
        }
    }

    pub fn routing_enabled(&self) -> bool {
        self.config.routing_enabled
    }

    /// Build server and client credentials from the TLS directory.
    ///
    /// The first successful build is cached; later calls return it without
    /// touching the filesystem. A failed build is not cached.
    pub fn build_credentials(&self) -> Result<Arc<TlsCredentials>, TlsError> {
        let mut cached = self.credentials.lock();
        if let Some(creds) = cached.as_ref() {
            return Ok(creds.clone());
        }

        let material = TlsMaterial::load(&self.config.tls_dir)?;
        let family = detect_cert_family(&material.ca_cert)?;
        let backend = backend_for(family);

        let creds = Arc::new(TlsCredentials {
            family,
            server: backend.server_config(&material)?,
            client: backend.client_config(&material, &self.config.domain_name)?,
        });
        info!(
            family = %family,
            "[fr-02] TLS credentials loaded from {}",
            self.config.tls_dir.display()
        );

        *cached = Some(creds.clone());
        Ok(creds)
    }

    /// Authenticate a stream from its peer leaf certificate (DER).
    ///
    /// Returns `Ok(None)` in single-network mode, otherwise the peer
    /// address from the certificate subject.
    pub fn authenticate(&self, leaf: Option<&[u8]>) -> Result<Option<PeerIdentity>, AuthError> {
        let der = leaf.ok_or(AuthError::CertMissing)?;
        let info = parse_leaf(der)?;

        match self.store.lookup(&info.serial) {
            Ok(Some(record)) => {
                warn!(
                    serial = %info.serial,
                    partition = %record.partition,
                    "[fr-02] Rejecting revoked certificate"
                );
                return Err(AuthError::CertRevoked(info.serial));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(serial = %info.serial, "[fr-02] Revocation lookup failed: {}", e);
                return Err(AuthError::StoreUnavailable(e.to_string()));
            }
        }

        if !self.config.routing_enabled {
            return Ok(None);
        }

        let address = info.address.ok_or(AuthError::AddressMissing)?;
        debug!(serial = %info.serial, peer = %address, "[fr-02] Peer authenticated");
        Ok(Some(PeerIdentity::new(address)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fr_01_revocation::{InMemoryRevocationStore, RevocationRecord, StoreError};
    use rcgen::{CertificateParams, DnType, KeyPair, SerialNumber};
    use shared_types::tls_files;
    use std::fs;
    use tempfile::TempDir;

    struct FailingStore;

    impl RevocationStore for FailingStore {
        fn lookup(&self, _serial: &str) -> Result<Option<RevocationRecord>, StoreError> {
            Err(StoreError::Backend("disk gone".into()))
        }
        fn insert(&self, _record: RevocationRecord) -> Result<u64, StoreError> {
            Err(StoreError::Backend("disk gone".into()))
        }
        fn latest_serial(&self, _partition: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
    }

    fn cert(serial: &[u8], address: Option<&str>) -> (rcgen::Certificate, KeyPair) {
        let mut params = CertificateParams::new(vec!["testnet".to_string()]).unwrap();
        params.serial_number = Some(SerialNumber::from_slice(serial));
        if let Some(address) = address {
            params
                .distinguished_name
                .push(DnType::CustomDnType(vec![2, 5, 4, 5]), address);
        }
        let key = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key).unwrap();
        (cert, key)
    }

    fn authenticator(store: Arc<dyn RevocationStore>, routing: bool, dir: PathBuf) -> TlsAuthenticator {
        TlsAuthenticator::new(
            TlsAuthConfig {
                tls_dir: dir,
                domain_name: "testnet".into(),
                routing_enabled: routing,
            },
            store,
        )
    }

    #[test]
    fn test_revoked_certificate_rejected() {
        let store = Arc::new(InMemoryRevocationStore::new());
        store.insert(RevocationRecord::new(1, "1234", "net1", 0)).unwrap();
        let auth = authenticator(store, true, PathBuf::new());
        let (leaf, _) = cert(&[0x04, 0xD2], Some("addrA"));

        assert_eq!(
            auth.authenticate(Some(leaf.der())),
            Err(AuthError::CertRevoked("1234".into()))
        );
    }

    #[test]
    fn test_unrevoked_certificate_yields_identity() {
        let auth = authenticator(Arc::new(InMemoryRevocationStore::new()), true, PathBuf::new());
        let (leaf, _) = cert(&[0x04, 0xD2], Some("addrA"));

        assert_eq!(
            auth.authenticate(Some(leaf.der())),
            Ok(Some(PeerIdentity::new("addrA")))
        );
    }

    #[test]
    fn test_revocation_takes_effect_for_later_streams() {
        let store = Arc::new(InMemoryRevocationStore::new());
        let auth = authenticator(store.clone(), true, PathBuf::new());
        let (leaf, _) = cert(&[0x04, 0xD2], Some("addrA"));

        assert!(auth.authenticate(Some(leaf.der())).is_ok());
        store.insert(RevocationRecord::new(1, "1234", "net1", 0)).unwrap();
        assert_eq!(
            auth.authenticate(Some(leaf.der())),
            Err(AuthError::CertRevoked("1234".into()))
        );
    }

    #[test]
    fn test_single_network_mode_passes_without_address() {
        let auth = authenticator(Arc::new(InMemoryRevocationStore::new()), false, PathBuf::new());
        let (leaf, _) = cert(&[0x07], None);
        assert_eq!(auth.authenticate(Some(leaf.der())), Ok(None));
    }

    #[test]
    fn test_missing_address_rejected_when_routing() {
        let auth = authenticator(Arc::new(InMemoryRevocationStore::new()), true, PathBuf::new());
        let (leaf, _) = cert(&[0x07], None);
        assert_eq!(auth.authenticate(Some(leaf.der())), Err(AuthError::AddressMissing));
    }

    #[test]
    fn test_missing_and_garbage_certificates() {
        let auth = authenticator(Arc::new(InMemoryRevocationStore::new()), true, PathBuf::new());
        assert_eq!(auth.authenticate(None), Err(AuthError::CertMissing));
        assert!(matches!(
            auth.authenticate(Some(b"junk")),
            Err(AuthError::CertInvalid(_))
        ));
    }

    #[test]
    fn test_store_failure_fails_closed() {
        let auth = authenticator(Arc::new(FailingStore), false, PathBuf::new());
        let (leaf, _) = cert(&[0x07], None);
        assert!(matches!(
            auth.authenticate(Some(leaf.der())),
            Err(AuthError::StoreUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_credentials_built_once() {
        let dir = TempDir::new().unwrap();
        let (ca, ca_key) = cert(&[0x01], None);
        fs::write(dir.path().join(tls_files::CA_CERT), ca.pem()).unwrap();
        fs::write(dir.path().join(tls_files::NODE_CERT), ca.pem()).unwrap();
        fs::write(dir.path().join(tls_files::NODE_KEY), ca_key.serialize_pem()).unwrap();

        let auth = authenticator(Arc::new(InMemoryRevocationStore::new()), false, dir.path().to_path_buf());
        let first = auth.build_credentials().unwrap();
        assert_eq!(first.family, CryptoFamily::Standard);

        // Removing the files does not matter once cached.
        fs::remove_file(dir.path().join(tls_files::NODE_KEY)).unwrap();
        let second = auth.build_credentials().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        assert!(tonic::transport::Server::builder()
            .tls_config(first.server.clone())
            .is_ok());
    }

    #[test]
    fn test_missing_material_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let auth = authenticator(Arc::new(InMemoryRevocationStore::new()), false, dir.path().to_path_buf());
        assert!(matches!(auth.build_credentials(), Err(TlsError::Material { .. })));
        assert!(matches!(auth.build_credentials(), Err(TlsError::Material { .. })));
    }
}
