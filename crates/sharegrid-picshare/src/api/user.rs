//! User profile, search and control panel endpoints.

use actix_web::{HttpRequest, HttpResponse, Responder, Scope, get, web};
use serde::Deserialize;

use sharegrid_api::response::RestResult;
use sharegrid_common::SharegridError;

use crate::model::{ControlPanel, UserDetail};
use crate::state::AppState;

use super::{authenticated_user, error_envelope};

#[derive(Debug, Deserialize)]
struct SearchQuery {
    query: String,
}

/// Substring search over usernames.
#[get("/search")]
async fn search(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    if let Err(e) = authenticated_user(&req, &state) {
        return HttpResponse::Ok().json(error_envelope::<Vec<String>>(&e));
    }
    HttpResponse::Ok().json(RestResult::ok(state.store.search_users(&query.query)))
}

/// A user's profile; private pictures appear only for the user themselves
/// and their friends.
#[get("/{username}")]
async fn detail(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let result = authenticated_user(&req, &state)
        .and_then(|viewer| state.store.user_detail(viewer.user_id, &path));

    match result {
        Ok(detail) => HttpResponse::Ok().json(RestResult::ok(detail)),
        Err(e) => HttpResponse::Ok().json(error_envelope::<UserDetail>(&e)),
    }
}

/// The caller's control panel: friends, pending requests and own pictures.
/// Only available for the account the token belongs to.
#[get("/{username}/panel")]
async fn panel(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let result = authenticated_user(&req, &state).and_then(|viewer| {
        if viewer.username != *path {
            return Err(SharegridError::AuthError(
                "the control panel is only visible to its owner".to_string(),
            ));
        }
        state.store.control_panel(viewer.user_id)
    });

    match result {
        Ok(panel) => HttpResponse::Ok().json(RestResult::ok(panel)),
        Err(e) => HttpResponse::Ok().json(error_envelope::<ControlPanel>(&e)),
    }
}

pub fn routes() -> Scope {
    web::scope("/v1/users")
        .service(search)
        .service(detail)
        .service(panel)
}
