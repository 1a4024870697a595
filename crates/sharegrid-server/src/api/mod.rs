//! HTTP API endpoints of the registry server.

pub mod registry;

use sharegrid_api::response::RestResult;
use sharegrid_common::{SharegridError, error};

/// Map a service error to the response envelope carrying its error code.
pub fn error_envelope<T>(err: &SharegridError) -> RestResult<T> {
    let code = match err {
        SharegridError::IllegalArgument(_) => error::PARAMETER_VALIDATE_ERROR.code,
        SharegridError::AuthError(_) => error::ACCESS_DENIED.code,
        SharegridError::SignatureError(_) => error::SIGNATURE_INVALID.code,
        SharegridError::UserNotExist(_) | SharegridError::NotFound(_) => {
            error::RESOURCE_NOT_FOUND.code
        }
        SharegridError::Conflict(_) => error::RESOURCE_CONFLICT.code,
        SharegridError::ProviderNotRegistered(_) => error::PROVIDER_NOT_FOUND.code,
        SharegridError::FileNotPublished(_) => error::FILE_NOT_FOUND.code,
        _ => error::SERVER_ERROR.code,
    };
    RestResult::err(code, &err.to_string())
}
