//! Sharegrid Registry - in-memory directory of providers and published files
//!
//! The registry anchors the trust chain: it signs provider certificates,
//! assigns provider and file ids, and serves the directories providers use
//! to discover each other.

pub mod service;

pub use service::RegistryService;
