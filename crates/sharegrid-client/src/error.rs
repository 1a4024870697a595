//! Client error types for the Sharegrid SDK

use sharegrid_common::SharegridError;

/// Error type for Sharegrid HTTP client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned error: code={code}, message={message}")]
    ServerError { code: i32, message: String },

    #[error("certificate rejected: {0}")]
    CertificateRejected(String),

    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),

    #[error("no certificate known for provider {0}")]
    UnknownProvider(u64),

    #[error(transparent)]
    Core(#[from] SharegridError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
