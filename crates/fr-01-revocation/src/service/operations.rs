//! # CA Operations
//!
//! Operator actions against the CA and the certificate bootstrap run at
//! startup.

use crate::domain::{RevocationError, RevocationRecord};
use crate::ports::{CaClient, CertSigner};
use crate::service::signing::sign_request;
use shared_types::ca::{
    CurrentCertRequest, CurrentCertResponse, EnrollNodeRequest, EnrollNodeResponse, RevokeListRequest,
};
use shared_types::tls_files;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// CA calls signed with the local node key.
pub struct CaOperations {
    ca: Arc<dyn CaClient>,
    signer: Arc<dyn CertSigner>,
}

impl CaOperations {
    pub fn new(ca: Arc<dyn CaClient>, signer: Arc<dyn CertSigner>) -> Self {
        Self { ca, signer }
    }

    /// Ask the CA to enroll `address` into `partition` under `admin`.
    pub async fn enroll_node(
        &self,
        address: &str,
        partition: &str,
        admin: &str,
    ) -> Result<EnrollNodeResponse, RevocationError> {
        let sign = sign_request(self.signer.as_ref(), &format!("{}{}", address, partition))?;
        let response = self
            .ca
            .enroll_node(EnrollNodeRequest {
                sign: Some(sign),
                net: partition.to_string(),
                admin_address: admin.to_string(),
                address: address.to_string(),
            })
            .await?;
        info!(address = %address, partition = %partition, "[fr-01] Node enrolled");
        Ok(response)
    }

    /// Fetch this node's certificate bundle for `partition`.
    pub async fn current_cert(&self, partition: &str) -> Result<CurrentCertResponse, RevocationError> {
        let address = self.signer.address().to_string();
        let sign = sign_request(self.signer.as_ref(), &format!("{}{}", address, partition))?;
        Ok(self
            .ca
            .current_cert(CurrentCertRequest {
                sign: Some(sign),
                net: partition.to_string(),
                address,
            })
            .await?)
    }

    /// Fetch the full revocation list for `partition` without storing it.
    pub async fn revoke_list(
        &self,
        partition: &str,
        since_serial: &str,
    ) -> Result<Vec<RevocationRecord>, RevocationError> {
        let sign = sign_request(self.signer.as_ref(), &format!("{}{}", since_serial, partition))?;
        let response = self
            .ca
            .revoke_list(RevokeListRequest {
                sign: Some(sign),
                net: partition.to_string(),
                serial_num: since_serial.to_string(),
            })
            .await?;
        Ok(response
            .list
            .iter()
            .map(|n| RevocationRecord::from_ca(n, partition))
            .collect())
    }

    /// Fetch the certificate bundle and write it into `tls_dir`.
    ///
    /// Returns `Ok(false)` without contacting the CA when a CA certificate is
    /// already present; existing material is never overwritten.
    pub async fn fetch_and_write_cert(
        &self,
        partition: &str,
        tls_dir: &Path,
    ) -> Result<bool, RevocationError> {
        if tls_dir.join(tls_files::CA_CERT).exists() {
            info!("[fr-01] Certificate already present in {}", tls_dir.display());
            return Ok(false);
        }

        let bundle = self.current_cert(partition).await?;

        fs::create_dir_all(tls_dir).map_err(|source| RevocationError::Io {
            path: tls_dir.display().to_string(),
            source,
        })?;

        let mut files = vec![
            (tls_files::CA_CERT, bundle.ca_cert.as_str()),
            (tls_files::NODE_CERT, bundle.cert.as_str()),
            (tls_files::NODE_KEY, bundle.private_key.as_str()),
        ];
        if !bundle.node_hd_pri_key.is_empty() {
            files.push((tls_files::HD_KEY, bundle.node_hd_pri_key.as_str()));
        } else {
            debug!("[fr-01] CA returned no derived key");
        }

        for (name, contents) in files {
            let path = tls_dir.join(name);
            fs::write(&path, contents).map_err(|source| RevocationError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }

        info!(partition = %partition, "[fr-01] Certificate written to {}", tls_dir.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockCaClient, StaticSigner};
    use tempfile::TempDir;

    fn bundle(hd: &str) -> CurrentCertResponse {
        CurrentCertResponse {
            cert: "CERT".into(),
            private_key: "KEY".into(),
            ca_cert: "CACERT".into(),
            node_hd_pri_key: hd.into(),
        }
    }

    fn ops(ca: Arc<MockCaClient>) -> CaOperations {
        CaOperations::new(ca, Arc::new(StaticSigner::new("node1")))
    }

    #[tokio::test]
    async fn test_writes_bundle() {
        let ca = Arc::new(MockCaClient::default());
        *ca.cert.lock() = bundle("HD");
        let dir = TempDir::new().unwrap();
        let tls = dir.path().join("tls");

        assert!(ops(ca).fetch_and_write_cert("net1", &tls).await.unwrap());

        assert_eq!(fs::read_to_string(tls.join(tls_files::CA_CERT)).unwrap(), "CACERT");
        assert_eq!(fs::read_to_string(tls.join(tls_files::NODE_CERT)).unwrap(), "CERT");
        assert_eq!(fs::read_to_string(tls.join(tls_files::NODE_KEY)).unwrap(), "KEY");
        assert_eq!(fs::read_to_string(tls.join(tls_files::HD_KEY)).unwrap(), "HD");
    }

    #[tokio::test]
    async fn test_empty_hd_key_not_written() {
        let ca = Arc::new(MockCaClient::default());
        *ca.cert.lock() = bundle("");
        let dir = TempDir::new().unwrap();

        ops(ca).fetch_and_write_cert("net1", dir.path()).await.unwrap();
        assert!(!dir.path().join(tls_files::HD_KEY).exists());
    }

    #[tokio::test]
    async fn test_existing_certificate_not_overwritten() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(tls_files::CA_CERT), "OLD").unwrap();

        // An unreachable CA proves no call is made.
        let written = ops(Arc::new(MockCaClient::unreachable()))
            .fetch_and_write_cert("net1", dir.path())
            .await
            .unwrap();

        assert!(!written);
        assert_eq!(fs::read_to_string(dir.path().join(tls_files::CA_CERT)).unwrap(), "OLD");
    }

    #[tokio::test]
    async fn test_enroll_signs_address_and_partition() {
        let ca = Arc::new(MockCaClient::default());
        ops(ca.clone()).enroll_node("peer9", "net1", "admin1").await.unwrap();

        let requests = ca.enroll_requests.lock();
        assert_eq!(requests[0].admin_address, "admin1");
        let sign = requests[0].sign.as_ref().unwrap();
        assert_eq!(sign.sign, hex::encode(format!("peer9net1{}", sign.nonce)));
    }

    #[tokio::test]
    async fn test_revoke_list_maps_records() {
        let ca = Arc::new(MockCaClient::with_revocations(vec![shared_types::ca::RevokeNode {
            id: 4,
            serial_num: "44".into(),
            create_time: 10,
        }]));
        let records = ops(ca).revoke_list("net1", "").await.unwrap();
        assert_eq!(records, vec![RevocationRecord::new(4, "44", "net1", 10)]);
    }
}
