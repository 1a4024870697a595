//! Account endpoints: signup and login.

use actix_web::{HttpResponse, Responder, Scope, post, web};
use tracing::warn;

use sharegrid_api::response::RestResult;

use crate::auth::encode_jwt_token;
use crate::model::{LoginRequest, LoginResponse, SignupRequest, UserSummary};
use crate::state::AppState;

use super::error_envelope;

#[post("/signup")]
async fn signup(state: web::Data<AppState>, body: web::Json<SignupRequest>) -> impl Responder {
    match state.store.signup(&body.username, &body.password) {
        Ok(user) => HttpResponse::Ok().json(RestResult::ok(user)),
        Err(e) => {
            warn!("Signup rejected: {}", e);
            HttpResponse::Ok().json(error_envelope::<UserSummary>(&e))
        }
    }
}

/// Check credentials and issue an access token.
#[post("/login")]
async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    let ttl = state.configuration.token_ttl_seconds();
    let result = state
        .store
        .login(&body.username, &body.password)
        .and_then(|user| {
            let token = encode_jwt_token(&user.username, &state.configuration.token_secret_key(), ttl)?;
            Ok(LoginResponse {
                access_token: token,
                token_ttl: ttl,
                username: user.username,
            })
        });

    match result {
        Ok(response) => HttpResponse::Ok().json(RestResult::ok(response)),
        Err(e) => {
            warn!("Login rejected: {}", e);
            HttpResponse::Ok().json(error_envelope::<LoginResponse>(&e))
        }
    }
}

pub fn routes() -> Scope {
    web::scope("/v1/auth").service(signup).service(login)
}
