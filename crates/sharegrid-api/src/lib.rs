//! Sharegrid API - wire models for the registry and peer protocols
//!
//! This crate provides:
//! - Certificates and the descriptors exchanged through the registry
//! - File buffers and the signed fetch tickets used between providers
//! - The common HTTP response envelope

pub mod model;
pub mod response;

// Re-export commonly used types
pub use model::{Certificate, FetchTicket, FileBuffer, FileDescriptor, ProviderDescriptor};
pub use response::RestResult;

/// Context path of the central registry API
pub const REGISTRY_PATH: &str = "/v1/registry";

/// Context path of the provider peer API
pub const PEER_PATH: &str = "/v1/peer";
