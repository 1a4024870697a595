//! Sharegrid Client - provider-side HTTP client
//!
//! This crate provides:
//! - `RegistryClient`: typed methods for the central registry API
//! - `PeerClient`: certificate exchange and signed file fetches between
//!   providers
//! - `TrustStore`: registry-verified peer certificates indexed by provider id

pub mod error;
pub mod http;
pub mod trust;

pub use error::ClientError;
pub use http::{ClientConfig, PeerClient, RegistryClient};
pub use trust::TrustStore;
