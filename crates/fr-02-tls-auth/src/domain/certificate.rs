//! X.509 inspection: serial, subject address and crypto family.

use crate::domain::{AuthError, TlsError};
use shared_types::CryptoFamily;
use x509_parser::prelude::*;

/// Subject attribute holding the peer address (X.520 `serialNumber`).
pub const ADDRESS_ATTR_OID: &str = "2.5.4.5";

/// SM2-with-SM3 signature algorithm.
pub const SM2_SIGNATURE_OID: &str = "1.2.156.10197.1.501";

/// Fields of a peer leaf certificate used for authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafInfo {
    /// Serial number, decimal.
    pub serial: String,
    /// Subject `serialNumber` attribute, if present.
    pub address: Option<String>,
}

/// Parse a DER leaf certificate.
pub fn parse_leaf(der: &[u8]) -> Result<LeafInfo, AuthError> {
    let (_, cert) = X509Certificate::from_der(der).map_err(|e| AuthError::CertInvalid(e.to_string()))?;

    let address = cert
        .subject()
        .iter_attributes()
        .find(|attr| attr.attr_type().to_id_string() == ADDRESS_ATTR_OID)
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_string)
        .filter(|a| !a.is_empty());

    Ok(LeafInfo {
        serial: cert.tbs_certificate.serial.to_string(),
        address,
    })
}

/// Crypto family of a PEM CA certificate, from its signature algorithm.
pub fn detect_cert_family(ca_pem: &[u8]) -> Result<CryptoFamily, TlsError> {
    let (_, pem) =
        x509_parser::pem::parse_x509_pem(ca_pem).map_err(|e| TlsError::InvalidCertificate(e.to_string()))?;
    let cert = pem
        .parse_x509()
        .map_err(|e| TlsError::InvalidCertificate(e.to_string()))?;

    if cert.signature_algorithm.algorithm.to_id_string() == SM2_SIGNATURE_OID {
        Ok(CryptoFamily::National)
    } else {
        Ok(CryptoFamily::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{CertificateParams, DnType, KeyPair, SerialNumber};

    fn leaf(serial: &[u8], address: Option<&str>) -> rcgen::Certificate {
        let mut params = CertificateParams::new(vec!["peer.local".to_string()]).unwrap();
        params.serial_number = Some(SerialNumber::from_slice(serial));
        if let Some(address) = address {
            params
                .distinguished_name
                .push(DnType::CustomDnType(vec![2, 5, 4, 5]), address);
        }
        let key = KeyPair::generate().unwrap();
        params.self_signed(&key).unwrap()
    }

    #[test]
    fn test_serial_is_decimal() {
        let cert = leaf(&[0x04, 0xD2], Some("addrA"));
        let info = parse_leaf(cert.der()).unwrap();
        assert_eq!(info.serial, "1234");
        assert_eq!(info.address.as_deref(), Some("addrA"));
    }

    #[test]
    fn test_missing_address() {
        let cert = leaf(&[0x01], None);
        assert_eq!(parse_leaf(cert.der()).unwrap().address, None);
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(matches!(parse_leaf(b"garbage"), Err(AuthError::CertInvalid(_))));
    }

    #[test]
    fn test_ecdsa_ca_is_standard() {
        let cert = leaf(&[0x01], None);
        assert_eq!(
            detect_cert_family(cert.pem().as_bytes()).unwrap(),
            CryptoFamily::Standard
        );
    }

    #[test]
    fn test_non_pem_ca_rejected() {
        assert!(matches!(
            detect_cert_family(b"not a pem"),
            Err(TlsError::InvalidCertificate(_))
        ));
    }
}
