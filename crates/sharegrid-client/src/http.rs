//! HTTP clients for the registry and peer APIs
//!
//! `RegistryClient` talks to the central registry; `PeerClient` talks to
//! other providers, verifying everything it receives against the registry's
//! public key before trusting it.

use std::time::Duration;

use reqwest::Client;
use secp256k1::PublicKey;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use sharegrid_api::model::{Certificate, FetchTicket, FileDescriptor, ProviderDescriptor};
use sharegrid_api::response::RestResult;
use sharegrid_api::{PEER_PATH, REGISTRY_PATH};

use crate::error::{ClientError, Result};
use crate::trust::TrustStore;

/// Configuration for the registry client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Registry address as `host:port`
    pub registry_addr: String,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            registry_addr: "127.0.0.1:8850".to_string(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 30000,
        }
    }
}

impl ClientConfig {
    /// Create a new config pointing at the given registry address
    pub fn new(registry_addr: &str) -> Self {
        Self {
            registry_addr: registry_addr.to_string(),
            ..Default::default()
        }
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }
}

fn build_http_client(config: &ClientConfig) -> Result<Client> {
    let client = Client::builder()
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .timeout(Duration::from_millis(config.read_timeout_ms))
        .no_proxy()
        .build()?;
    Ok(client)
}

/// Client for the central registry API
pub struct RegistryClient {
    client: Client,
    config: ClientConfig,
}

impl RegistryClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = build_http_client(&config)?;
        Ok(Self { client, config })
    }

    fn build_url(&self, path: &str) -> String {
        format!("http://{}{}{}", self.config.registry_addr, REGISTRY_PATH, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.build_url(path);
        debug!(%url, "GET");
        let envelope = self
            .client
            .get(&url)
            .send()
            .await?
            .json::<RestResult<T>>()
            .await?;
        unwrap_envelope(envelope)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.build_url(path);
        debug!(%url, "POST");
        let envelope = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?
            .json::<RestResult<T>>()
            .await?;
        unwrap_envelope(envelope)
    }

    /// Fetch the registry's own certificate, carrying its public key.
    pub async fn registry_certificate(&self) -> Result<Certificate> {
        self.get("/certificate").await
    }

    /// Submit an unsigned certificate for signing.
    ///
    /// The reply carries the registry-assigned provider id and the registry
    /// signature; it is verified against `registry_key` before being
    /// returned, so a rogue registry endpoint cannot hand out certificates
    /// it did not sign.
    pub async fn sign_certificate(
        &self,
        certificate: &Certificate,
        registry_key: &PublicKey,
    ) -> Result<Certificate> {
        let signed: Certificate = self.post_json("/certificate", certificate).await?;

        if !signed.verify(registry_key) {
            return Err(ClientError::CertificateRejected(
                "registry signature on own certificate does not verify".to_string(),
            ));
        }
        if signed.public_key != certificate.public_key {
            return Err(ClientError::CertificateRejected(
                "registry altered the certificate public key".to_string(),
            ));
        }

        Ok(signed)
    }

    /// Publish file descriptors; the reply carries registry-assigned file ids.
    pub async fn publish_files(&self, files: &[FileDescriptor]) -> Result<Vec<FileDescriptor>> {
        self.post_json("/files", files).await
    }

    /// Directory of all registered providers.
    pub async fn providers(&self) -> Result<Vec<ProviderDescriptor>> {
        self.get("/providers").await
    }

    /// Directory of all published files.
    pub async fn published_files(&self) -> Result<Vec<FileDescriptor>> {
        self.get("/files").await
    }

    /// Published files of other providers, excluding our own.
    pub async fn remote_files(&self, own_provider_id: u64) -> Result<Vec<FileDescriptor>> {
        let files = self.published_files().await?;
        Ok(files
            .into_iter()
            .filter(|f| f.provider_id != own_provider_id)
            .collect())
    }
}

/// Client for the provider-to-provider API
pub struct PeerClient {
    client: Client,
    registry_key: PublicKey,
    trust: TrustStore,
}

impl PeerClient {
    /// Create a peer client.
    ///
    /// `trust` is typically shared with the inbound peer server, so that a
    /// certificate exchange in either direction makes the peer known to both.
    pub fn new(config: &ClientConfig, registry_key: PublicKey, trust: TrustStore) -> Result<Self> {
        let client = build_http_client(config)?;
        Ok(Self {
            client,
            registry_key,
            trust,
        })
    }

    pub fn trust(&self) -> &TrustStore {
        &self.trust
    }

    fn build_url(address: &str, path: &str) -> String {
        format!("http://{address}{PEER_PATH}{path}")
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        address: &str,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = Self::build_url(address, path);
        debug!(%url, "POST");
        let envelope = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?
            .json::<RestResult<T>>()
            .await?;
        unwrap_envelope(envelope)
    }

    /// Exchange certificates with the peer at `address`.
    ///
    /// Sends our signed certificate and admits the peer's into the trust
    /// store, verifying its registry signature first.
    pub async fn exchange_certificates(
        &self,
        address: &str,
        own_certificate: &Certificate,
    ) -> Result<Certificate> {
        let peer_certificate: Certificate = self
            .post_json(address, "/certificate", own_certificate)
            .await?;

        self.trust
            .admit(peer_certificate.clone(), &self.registry_key)?;

        debug!(
            provider_id = peer_certificate.provider_id,
            name = %peer_certificate.name,
            "Admitted peer certificate"
        );
        Ok(peer_certificate)
    }

    /// Send a signed fetch ticket to the file's owner and return the filled
    /// ticket.
    ///
    /// The owner must already be in the trust store; the reply signature is
    /// verified against the owner's certificate key.
    pub async fn fetch(&self, address: &str, ticket: &FetchTicket) -> Result<FetchTicket> {
        let owner_id = ticket.descriptor.provider_id;
        let owner_key = self.trust.peer_key(owner_id)?;

        let reply: FetchTicket = self.post_json(address, "/fetch", ticket).await?;

        if !reply.verify(&owner_key) {
            return Err(ClientError::SignatureInvalid(format!(
                "reply for file {} not signed by provider {}",
                ticket.descriptor.file_id, owner_id
            )));
        }
        if reply.descriptor.file_id != ticket.descriptor.file_id {
            return Err(ClientError::SignatureInvalid(format!(
                "reply descriptor mismatch: asked for file {}, got {}",
                ticket.descriptor.file_id, reply.descriptor.file_id
            )));
        }

        Ok(reply)
    }
}

fn unwrap_envelope<T>(envelope: RestResult<T>) -> Result<T> {
    if envelope.is_ok() {
        envelope.into_data().map_err(ClientError::Core)
    } else {
        Err(ClientError::ServerError {
            code: envelope.code,
            message: envelope.message.unwrap_or_default(),
        })
    }
}
