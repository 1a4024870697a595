//! Error types and error codes for Sharegrid
//!
//! This module defines:
//! - `SharegridError`: Application-specific error enum
//! - `ErrorCode`: Structured error codes for API responses

use serde::{Deserialize, Serialize};

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum SharegridError {
    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("user '{0}' not exist!")]
    UserNotExist(String),

    #[error("authentication error: {0}")]
    AuthError(String),

    #[error("signature error: {0}")]
    SignatureError(String),

    #[error("network error: {0}")]
    NetworkError(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("provider {0} not registered")]
    ProviderNotRegistered(u64),

    #[error("file {0} not published")]
    FileNotPublished(u64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    InternalError(String),
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

// General success and error codes
pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const PARAMETER_MISSING: ErrorCode<'static> = ErrorCode {
    code: 10000,
    message: "parameter missing",
};

pub const ACCESS_DENIED: ErrorCode<'static> = ErrorCode {
    code: 10001,
    message: "access denied",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "parameter validate error",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 10003,
    message: "resource not found",
};

pub const RESOURCE_CONFLICT: ErrorCode<'static> = ErrorCode {
    code: 10004,
    message: "resource conflict",
};

// Certificate and signature errors
pub const CERTIFICATE_INVALID: ErrorCode<'static> = ErrorCode {
    code: 20000,
    message: "certificate verification failed",
};

pub const SIGNATURE_INVALID: ErrorCode<'static> = ErrorCode {
    code: 20001,
    message: "request signature verification failed",
};

pub const PROVIDER_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "provider not found",
};

pub const FILE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20003,
    message: "file not found",
};

pub const SERVER_ERROR: ErrorCode<'static> = ErrorCode {
    code: 30000,
    message: "server error",
};
