//! Signing primitives for the certificate infrastructure
//!
//! Every registry and provider process owns a `SigningIdentity`, a freshly
//! generated secp256k1 keypair. Certificates and fetch tickets are signed as
//! ECDSA signatures over SHA-256 digests of their canonical fields.
//!
//! Public keys travel on the wire as lowercase hex of the compressed SEC1
//! encoding; signatures as hex-encoded DER.

use rand::RngCore;
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey, ecdsa::Signature};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Error types for signing operations
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid public key: {0}")]
    InvalidKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

/// Result type for signing operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// A process-local signing keypair.
///
/// Generated at startup and never persisted, matching the lifetime of the
/// certificate it backs.
pub struct SigningIdentity {
    secp: Secp256k1<All>,
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl SigningIdentity {
    /// Generate a fresh identity from OS randomness.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 32];

        // from_slice rejects 0 and values >= the curve order; retry until a
        // valid scalar comes out (in practice the first draw succeeds).
        let secret_key = loop {
            rng.fill_bytes(&mut bytes);
            if let Ok(key) = SecretKey::from_slice(&bytes) {
                break key;
            }
        };

        let public_key = PublicKey::from_secret_key(&secp, &secret_key);

        Self {
            secp,
            secret_key,
            public_key,
        }
    }

    /// The public half of this identity.
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Hex encoding of the compressed public key, as carried in certificates.
    pub fn public_key_hex(&self) -> String {
        self.public_key.to_string()
    }

    /// Sign a 32-byte digest.
    pub fn sign_digest(&self, digest: [u8; 32]) -> Signature {
        let message = Message::from_digest(digest);
        self.secp.sign_ecdsa(&message, &self.secret_key)
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Secret key deliberately omitted
        f.debug_struct("SigningIdentity")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Verify an ECDSA signature over a 32-byte digest.
pub fn verify_digest(digest: [u8; 32], signature: &Signature, public_key: &PublicKey) -> bool {
    let secp = Secp256k1::verification_only();
    let message = Message::from_digest(digest);
    secp.verify_ecdsa(&message, signature, public_key).is_ok()
}

/// Parse a hex-encoded compressed public key.
pub fn parse_public_key(hex: &str) -> CryptoResult<PublicKey> {
    hex.parse::<PublicKey>()
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Parse a hex-encoded DER signature.
pub fn parse_signature(hex: &str) -> CryptoResult<Signature> {
    hex.parse::<Signature>()
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
}

/// SHA-256 over a sequence of byte chunks.
pub fn digest_chunks<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    hasher.finalize().into()
}
