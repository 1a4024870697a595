//! Trust store of registry-verified peer certificates

use std::sync::Arc;

use dashmap::DashMap;
use secp256k1::PublicKey;

use sharegrid_api::model::Certificate;

use crate::error::{ClientError, Result};

/// Certificates of peers whose registry signature has already been checked,
/// indexed by provider id.
///
/// Only [`TrustStore::admit`] inserts, and it verifies the registry signature
/// first, so anything retrieved from the store is known-good. Clones share
/// the underlying map, so the peer server and the outbound client see the
/// same set of trusted peers.
#[derive(Clone, Default)]
pub struct TrustStore {
    certificates: Arc<DashMap<u64, Certificate>>,
}

impl TrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify `certificate` against the registry key and store it.
    ///
    /// Rejects unsigned certificates, bad signatures and certificates that
    /// never went through the registry (unassigned provider id).
    pub fn admit(&self, certificate: Certificate, registry_key: &PublicKey) -> Result<()> {
        if certificate.provider_id == sharegrid_common::UNASSIGNED_ID {
            return Err(ClientError::CertificateRejected(format!(
                "certificate for '{}' has no provider id",
                certificate.name
            )));
        }
        if !certificate.verify(registry_key) {
            return Err(ClientError::CertificateRejected(format!(
                "registry signature on certificate for '{}' does not verify",
                certificate.name
            )));
        }

        self.certificates
            .insert(certificate.provider_id, certificate);
        Ok(())
    }

    pub fn contains(&self, provider_id: u64) -> bool {
        self.certificates.contains_key(&provider_id)
    }

    pub fn get(&self, provider_id: u64) -> Option<Certificate> {
        self.certificates.get(&provider_id).map(|c| c.clone())
    }

    /// Public key of a trusted peer.
    pub fn peer_key(&self, provider_id: u64) -> Result<PublicKey> {
        let certificate = self
            .certificates
            .get(&provider_id)
            .ok_or(ClientError::UnknownProvider(provider_id))?;

        certificate
            .holder_key()
            .map_err(|e| ClientError::CertificateRejected(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharegrid_common::crypto::SigningIdentity;

    fn signed_certificate(registry: &SigningIdentity, provider_id: u64) -> Certificate {
        let holder = SigningIdentity::generate();
        let mut cert = Certificate::new(
            format!("provider-{provider_id}"),
            "127.0.0.1:9001".to_string(),
            holder.public_key_hex(),
        );
        cert.provider_id = provider_id;
        cert.sign(registry);
        cert
    }

    #[test]
    fn test_admit_and_lookup() {
        let registry = SigningIdentity::generate();
        let store = TrustStore::new();

        let cert = signed_certificate(&registry, 1);
        store.admit(cert.clone(), &registry.public_key()).unwrap();

        assert!(store.contains(1));
        assert_eq!(store.get(1).unwrap().name, cert.name);
        assert!(store.peer_key(1).is_ok());
    }

    #[test]
    fn test_admit_rejects_bad_signature() {
        let registry = SigningIdentity::generate();
        let impostor = SigningIdentity::generate();
        let store = TrustStore::new();

        let cert = signed_certificate(&impostor, 1);
        let err = store.admit(cert, &registry.public_key()).unwrap_err();
        assert!(matches!(err, ClientError::CertificateRejected(_)));
        assert!(!store.contains(1));
    }

    #[test]
    fn test_admit_rejects_unassigned_id() {
        let registry = SigningIdentity::generate();
        let store = TrustStore::new();

        let holder = SigningIdentity::generate();
        let mut cert = Certificate::new(
            "provider-x".to_string(),
            "127.0.0.1:9001".to_string(),
            holder.public_key_hex(),
        );
        cert.sign(&registry);

        assert!(store.admit(cert, &registry.public_key()).is_err());
    }

    #[test]
    fn test_clones_share_state() {
        let registry = SigningIdentity::generate();
        let store = TrustStore::new();
        let clone = store.clone();

        clone
            .admit(signed_certificate(&registry, 5), &registry.public_key())
            .unwrap();
        assert!(store.contains(5));
    }

    #[test]
    fn test_peer_key_unknown_provider() {
        let store = TrustStore::new();
        assert!(matches!(
            store.peer_key(9),
            Err(ClientError::UnknownProvider(9))
        ));
    }
}
