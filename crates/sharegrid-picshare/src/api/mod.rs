//! HTTP API of the Picshare backend, under the `/v1` scope.

pub mod auth;
pub mod friend;
pub mod picture;
pub mod user;

use actix_web::{HttpMessage, HttpRequest};

use sharegrid_common::{SharegridError, error};

use crate::middleware::AuthContext;
use crate::model::UserSummary;
use crate::state::AppState;

/// Map a domain error to the wire envelope.
pub fn error_envelope<T>(e: &SharegridError) -> sharegrid_api::response::RestResult<T> {
    let code = match e {
        SharegridError::IllegalArgument(_) => error::PARAMETER_VALIDATE_ERROR.code,
        SharegridError::AuthError(_) => error::ACCESS_DENIED.code,
        SharegridError::UserNotExist(_) | SharegridError::NotFound(_) => {
            error::RESOURCE_NOT_FOUND.code
        }
        SharegridError::Conflict(_) => error::RESOURCE_CONFLICT.code,
        _ => error::SERVER_ERROR.code,
    };
    sharegrid_api::response::RestResult::err(code, &e.to_string())
}

/// Resolve the caller from the token context the middleware stored.
pub fn authenticated_user(
    req: &HttpRequest,
    state: &AppState,
) -> Result<UserSummary, SharegridError> {
    let context = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .unwrap_or_default();

    if !context.token_provided {
        return Err(SharegridError::AuthError(
            "access token required".to_string(),
        ));
    }
    if let Some(jwt_error) = context.jwt_error {
        return Err(SharegridError::AuthError(jwt_error));
    }

    state.store.user_by_name(&context.username).map_err(|_| {
        SharegridError::AuthError("token does not match a known user".to_string())
    })
}
