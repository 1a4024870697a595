//! Registry service layer
//!
//! This module provides the in-memory directories behind the central
//! registry API: certificate signing with provider id assignment, file
//! publication with file id assignment, and directory snapshots.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::info;

use sharegrid_api::model::{Certificate, FileDescriptor, ProviderDescriptor};
use sharegrid_common::crypto::SigningIdentity;
use sharegrid_common::{SharegridError, UNASSIGNED_ID};

/// In-memory registry of providers and their published files.
#[derive(Clone)]
pub struct RegistryService {
    identity: Arc<SigningIdentity>,
    /// The registry's own certificate, handed to providers on request
    certificate: Certificate,
    /// Key: provider_id
    providers: Arc<DashMap<u64, ProviderDescriptor>>,
    /// Key: file_id
    files: Arc<DashMap<u64, FileDescriptor>>,
    provider_id_counter: Arc<AtomicU64>,
    file_id_counter: Arc<AtomicU64>,
}

impl RegistryService {
    /// Create a registry with a fresh signing identity.
    ///
    /// `name` and `address` describe the registry itself and end up in the
    /// certificate served to providers.
    pub fn new(name: &str, address: &str) -> Self {
        let identity = SigningIdentity::generate();
        let certificate = Certificate::new(
            name.to_string(),
            address.to_string(),
            identity.public_key_hex(),
        );

        Self {
            identity: Arc::new(identity),
            certificate,
            providers: Arc::new(DashMap::new()),
            files: Arc::new(DashMap::new()),
            provider_id_counter: Arc::new(AtomicU64::new(1)),
            file_id_counter: Arc::new(AtomicU64::new(1)),
        }
    }

    /// The registry's own certificate (self-describing, unsigned).
    pub fn certificate(&self) -> Certificate {
        self.certificate.clone()
    }

    /// Sign a provider certificate and record the provider in the directory.
    ///
    /// Assigns the next provider id, signs the certificate with the registry
    /// identity and returns it. Id assignment is atomic, so concurrent
    /// registrations never collide.
    pub fn sign_certificate(
        &self,
        mut certificate: Certificate,
    ) -> Result<Certificate, SharegridError> {
        if certificate.name.is_empty() {
            return Err(SharegridError::IllegalArgument(
                "certificate holder name is empty".to_string(),
            ));
        }
        certificate
            .holder_key()
            .map_err(|e| SharegridError::IllegalArgument(e.to_string()))?;

        let provider_id = self.provider_id_counter.fetch_add(1, Ordering::SeqCst);
        certificate.provider_id = provider_id;
        certificate.sign(&self.identity);

        let descriptor = ProviderDescriptor {
            provider_id,
            name: certificate.name.clone(),
            address: certificate.address.clone(),
        };

        info!(
            provider_id,
            name = %descriptor.name,
            address = %descriptor.address,
            "Signed certificate and registered provider"
        );
        self.providers.insert(provider_id, descriptor);

        Ok(certificate)
    }

    /// Publish file descriptors, assigning a fresh file id to each.
    ///
    /// Every descriptor must already carry the provider id of its owner.
    /// Re-publication allocates new ids; the registry never dedupes.
    pub fn publish_files(
        &self,
        mut files: Vec<FileDescriptor>,
    ) -> Result<Vec<FileDescriptor>, SharegridError> {
        for file in &files {
            if file.provider_id == UNASSIGNED_ID {
                return Err(SharegridError::IllegalArgument(format!(
                    "file '{}' has no provider id",
                    file.name
                )));
            }
            if !self.providers.contains_key(&file.provider_id) {
                return Err(SharegridError::ProviderNotRegistered(file.provider_id));
            }
        }

        for file in &mut files {
            let file_id = self.file_id_counter.fetch_add(1, Ordering::SeqCst);
            file.file_id = file_id;
            self.files.insert(file_id, file.clone());
        }

        if let Some(first) = files.first() {
            info!(
                count = files.len(),
                provider_id = first.provider_id,
                "Published files"
            );
        }

        Ok(files)
    }

    /// Snapshot of the provider directory, ordered by provider id.
    pub fn providers(&self) -> Vec<ProviderDescriptor> {
        let mut providers: Vec<ProviderDescriptor> =
            self.providers.iter().map(|entry| entry.value().clone()).collect();
        providers.sort_by_key(|p| p.provider_id);
        providers
    }

    /// Snapshot of the published file directory, ordered by file id.
    pub fn published_files(&self) -> Vec<FileDescriptor> {
        let mut files: Vec<FileDescriptor> =
            self.files.iter().map(|entry| entry.value().clone()).collect();
        files.sort_by_key(|f| f.file_id);
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned_certificate(name: &str) -> Certificate {
        let identity = SigningIdentity::generate();
        Certificate::new(
            name.to_string(),
            "127.0.0.1:9001".to_string(),
            identity.public_key_hex(),
        )
    }

    #[test]
    fn test_sign_certificate_assigns_sequential_ids() {
        let registry = RegistryService::new("registry", "127.0.0.1:8848");

        let first = registry
            .sign_certificate(unsigned_certificate("alpha"))
            .unwrap();
        let second = registry
            .sign_certificate(unsigned_certificate("beta"))
            .unwrap();

        assert_eq!(first.provider_id, 1);
        assert_eq!(second.provider_id, 2);
        assert_eq!(registry.providers().len(), 2);
    }

    #[test]
    fn test_signed_certificate_verifies_against_registry_key() {
        let registry = RegistryService::new("registry", "127.0.0.1:8848");
        let registry_key = registry
            .certificate()
            .holder_key()
            .expect("registry certificate carries its own key");

        let signed = registry
            .sign_certificate(unsigned_certificate("alpha"))
            .unwrap();
        assert!(signed.verify(&registry_key));
    }

    #[test]
    fn test_sign_certificate_rejects_bad_key() {
        let registry = RegistryService::new("registry", "127.0.0.1:8848");
        let cert = Certificate::new(
            "alpha".to_string(),
            "127.0.0.1:9001".to_string(),
            "not-a-key".to_string(),
        );
        assert!(registry.sign_certificate(cert).is_err());
    }

    #[test]
    fn test_sign_certificate_rejects_empty_name() {
        let registry = RegistryService::new("registry", "127.0.0.1:8848");
        let identity = SigningIdentity::generate();
        let cert = Certificate::new(
            String::new(),
            "127.0.0.1:9001".to_string(),
            identity.public_key_hex(),
        );
        assert!(registry.sign_certificate(cert).is_err());
    }

    #[test]
    fn test_publish_files_assigns_ids() {
        let registry = RegistryService::new("registry", "127.0.0.1:8848");
        let signed = registry
            .sign_certificate(unsigned_certificate("alpha"))
            .unwrap();

        let mut file = FileDescriptor::new("a.txt".into(), "alice".into(), "alpha".into());
        file.provider_id = signed.provider_id;

        let published = registry.publish_files(vec![file.clone(), file]).unwrap();
        assert_eq!(published[0].file_id, 1);
        assert_eq!(published[1].file_id, 2);
        assert_eq!(registry.published_files().len(), 2);
    }

    #[test]
    fn test_publish_files_rejects_unknown_provider() {
        let registry = RegistryService::new("registry", "127.0.0.1:8848");

        let mut file = FileDescriptor::new("a.txt".into(), "alice".into(), "alpha".into());
        file.provider_id = 99;

        assert!(matches!(
            registry.publish_files(vec![file]),
            Err(SharegridError::ProviderNotRegistered(99))
        ));
    }

    #[test]
    fn test_publish_files_rejects_unassigned_provider_id() {
        let registry = RegistryService::new("registry", "127.0.0.1:8848");
        let file = FileDescriptor::new("a.txt".into(), "alice".into(), "alpha".into());
        assert!(registry.publish_files(vec![file]).is_err());
    }

    #[test]
    fn test_concurrent_registration_ids_unique() {
        let registry = RegistryService::new("registry", "127.0.0.1:8848");
        let mut handles = Vec::new();

        for i in 0..8 {
            let registry = registry.clone();
            handles.push(std::thread::spawn(move || {
                registry
                    .sign_certificate(unsigned_certificate(&format!("provider-{}", i)))
                    .unwrap()
                    .provider_id
            }));
        }

        let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }
}
