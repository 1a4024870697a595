//! Data models for the registry and peer wire protocols
//!
//! This module defines the structures exchanged between the central registry
//! and providers, and between providers themselves:
//! - Certificates anchoring the registry-backed trust chain
//! - Provider and file descriptors
//! - File buffers and signed fetch tickets

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

use sharegrid_common::crypto::{self, SigningIdentity};
use sharegrid_common::UNASSIGNED_ID;

// Ticket type tag folded into the fetch digest
const FETCH_TICKET_TAG: &[u8] = b"fetch";

/// A digital certificate binding a holder name and address to a public key.
///
/// A certificate is created unsigned by its holder, then submitted to the
/// central registry which assigns a provider id and signs it. Providers accept
/// each other's certificates only when the registry signature verifies.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub name: String,
    /// `host:port` of the holder's HTTP endpoint
    pub address: String,
    /// Hex-encoded compressed secp256k1 public key
    pub public_key: String,
    /// Registry-assigned id, `UNASSIGNED_ID` until signed
    pub provider_id: u64,
    /// Hex-encoded DER signature by the registry, absent until signed
    pub signature: Option<String>,
}

impl Certificate {
    pub fn new(name: String, address: String, public_key: String) -> Self {
        Self {
            name,
            address,
            public_key,
            provider_id: UNASSIGNED_ID,
            signature: None,
        }
    }

    /// Digest covering the holder name and public key.
    ///
    /// The registry-assigned id and address are deliberately outside the
    /// digest: the signature binds identity to key, nothing else.
    pub fn digest(&self) -> [u8; 32] {
        crypto::digest_chunks([self.name.as_bytes(), self.public_key.as_bytes()])
    }

    /// Sign this certificate with the given identity (the registry's).
    pub fn sign(&mut self, identity: &SigningIdentity) {
        self.signature = Some(identity.sign_digest(self.digest()).to_string());
    }

    /// Verify the signature against the given public key (the registry's).
    ///
    /// Unsigned or malformed certificates fail closed.
    pub fn verify(&self, registry_key: &PublicKey) -> bool {
        let Some(sig_hex) = &self.signature else {
            return false;
        };
        let Ok(signature) = crypto::parse_signature(sig_hex) else {
            return false;
        };
        crypto::verify_digest(self.digest(), &signature, registry_key)
    }

    /// Parse the holder's public key out of the certificate.
    pub fn holder_key(&self) -> Result<PublicKey, crypto::CryptoError> {
        crypto::parse_public_key(&self.public_key)
    }
}

/// A provider as known to the registry directory.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescriptor {
    pub provider_id: u64,
    pub name: String,
    pub address: String,
}

/// Description of a shared file: name, author and a one-line description.
///
/// `file_id` and `provider_id` stay `UNASSIGNED_ID` until the registry
/// assigns them at publish time.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub file_id: u64,
    pub provider_id: u64,
    pub name: String,
    pub author: String,
    pub description: String,
}

impl FileDescriptor {
    /// Column header matching the `Display` row format.
    pub const HEADER: &'static str =
        " F_ID  SP File            Author     Description";

    pub fn new(name: String, author: String, description: String) -> Self {
        Self {
            file_id: UNASSIGNED_ID,
            provider_id: UNASSIGNED_ID,
            name,
            author,
            description,
        }
    }

    /// Load descriptors for all regular files under `path`, attributed to
    /// `author`. The first line of each file is taken as its description.
    pub fn load_dir(author: &str, path: &Path) -> std::io::Result<Vec<FileDescriptor>> {
        if !path.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a directory", path.display()),
            ));
        }

        let mut descriptors = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name == ".DS_Store" {
                continue;
            }

            let content = fs::read_to_string(entry.path())?;
            let description = content.lines().next().unwrap_or_default().to_string();

            descriptors.push(FileDescriptor::new(
                file_name,
                author.to_string(),
                description,
            ));
        }

        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(descriptors)
    }
}

impl Display for FileDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let description = if self.description.chars().count() > 43 {
            let head: String = self.description.chars().take(40).collect();
            format!("{}...", head)
        } else {
            self.description.clone()
        };

        write!(
            f,
            "{:5} {:3} {:<15} {:<10} {:<43}",
            self.file_id, self.provider_id, self.name, self.author, description
        )
    }
}

/// In-memory content of a shared file, loaded line by line.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBuffer {
    pub descriptor: FileDescriptor,
    pub lines: Vec<String>,
}

impl FileBuffer {
    pub fn new(descriptor: FileDescriptor) -> Self {
        Self {
            descriptor,
            lines: Vec::new(),
        }
    }

    /// Load the content of `directory/<name>` into the buffer.
    pub fn load(&mut self, directory: &Path) -> std::io::Result<()> {
        let path = directory.join(&self.descriptor.name);
        let content = fs::read_to_string(path)?;
        self.lines = content.lines().map(str::to_string).collect();
        Ok(())
    }

    /// Write the buffer content to `directory/<name>`.
    pub fn save(&self, directory: &Path, name: &str) -> std::io::Result<()> {
        let path = directory.join(name);
        let mut content = self.lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(path, content)
    }
}

impl Display for FileBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}:", self.descriptor.name)?;
        for line in &self.lines {
            writeln!(f, "\t{}", line)?;
        }
        Ok(())
    }
}

/// A signed request for the content of a remote file.
///
/// The requester sends the ticket with empty `lines` and its own signature.
/// The owning provider verifies it, loads the file content into `lines`,
/// re-signs, and returns the filled ticket so the requester can verify the
/// reply in turn.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchTicket {
    pub descriptor: FileDescriptor,
    pub requester_id: u64,
    pub username: String,
    pub lines: Vec<String>,
    /// Hex-encoded DER signature over [`FetchTicket::digest`]
    pub signature: Option<String>,
}

impl FetchTicket {
    pub fn new(descriptor: FileDescriptor, requester_id: u64, username: String) -> Self {
        Self {
            descriptor,
            requester_id,
            username,
            lines: Vec::new(),
            signature: None,
        }
    }

    /// Digest covering the requesting user, the content lines and the
    /// owner/requester/file id triple.
    pub fn digest(&self) -> [u8; 32] {
        let ids = format!(
            "{} {} {} {}",
            self.descriptor.provider_id,
            self.requester_id,
            self.descriptor.provider_id,
            self.descriptor.file_id
        );

        let mut chunks: Vec<&[u8]> = vec![self.username.as_bytes(), FETCH_TICKET_TAG];
        for line in &self.lines {
            chunks.push(line.as_bytes());
        }
        chunks.push(ids.as_bytes());

        crypto::digest_chunks(chunks)
    }

    pub fn sign(&mut self, identity: &SigningIdentity) {
        self.signature = Some(identity.sign_digest(self.digest()).to_string());
    }

    pub fn verify(&self, key: &PublicKey) -> bool {
        let Some(sig_hex) = &self.signature else {
            return false;
        };
        let Ok(signature) = crypto::parse_signature(sig_hex) else {
            return false;
        };
        crypto::verify_digest(self.digest(), &signature, key)
    }
}
