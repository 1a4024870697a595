//! Sharegrid Common - shared error types and signing primitives
//!
//! This crate provides the foundation used across all Sharegrid components:
//! - Error types and error codes
//! - Signing identities and digest helpers for the certificate infrastructure
//! - Small utility functions

pub mod crypto;
pub mod error;
pub mod utils;

// Re-exports for convenience
pub use crypto::{SigningIdentity, verify_digest};
pub use error::{ErrorCode, SharegridError};
pub use utils::now_millis;

/// Provider id value meaning "not yet assigned by the registry"
pub const UNASSIGNED_ID: u64 = 0;
