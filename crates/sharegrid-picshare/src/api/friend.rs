//! Friendship endpoints: requests, resolution and removal.

use actix_web::{HttpRequest, HttpResponse, Responder, Scope, delete, get, post, web};
use tracing::warn;

use sharegrid_api::response::RestResult;
use sharegrid_common::SharegridError;

use crate::model::{FriendRequestCreate, FriendRequestResolution, FriendRequestView, FriendView};
use crate::state::AppState;

use super::{authenticated_user, error_envelope};

/// The caller's friends.
#[get("")]
async fn friends(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    match authenticated_user(&req, &state) {
        Ok(user) => HttpResponse::Ok().json(RestResult::ok(state.store.friends_of(user.user_id))),
        Err(e) => HttpResponse::Ok().json(error_envelope::<Vec<FriendView>>(&e)),
    }
}

/// Pending requests addressed to the caller.
#[get("/requests")]
async fn requests(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    match authenticated_user(&req, &state) {
        Ok(user) => {
            HttpResponse::Ok().json(RestResult::ok(state.store.requests_for(user.user_id)))
        }
        Err(e) => HttpResponse::Ok().json(error_envelope::<Vec<FriendRequestView>>(&e)),
    }
}

#[post("/requests")]
async fn send_request(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<FriendRequestCreate>,
) -> impl Responder {
    let result = authenticated_user(&req, &state)
        .and_then(|user| state.store.send_friend_request(user.user_id, body.user_id));

    match result {
        Ok(request) => HttpResponse::Ok().json(RestResult::ok(request)),
        Err(e) => {
            warn!("Friend request rejected: {}", e);
            HttpResponse::Ok().json(error_envelope::<FriendRequestView>(&e))
        }
    }
}

/// Accept or decline a pending request; `response` is `accept` or
/// `decline`. Recipient only.
#[post("/requests/{id}/resolve")]
async fn resolve_request(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<FriendRequestResolution>,
) -> impl Responder {
    let result = authenticated_user(&req, &state).and_then(|user| {
        let accept = match body.response.as_str() {
            "accept" => true,
            "decline" => false,
            other => {
                return Err(SharegridError::IllegalArgument(format!(
                    "unknown resolution '{}'",
                    other
                )));
            }
        };
        state.store.resolve_friend_request(*path, user.user_id, accept)
    });

    match result {
        Ok(()) => HttpResponse::Ok().json(RestResult::ok(())),
        Err(e) => HttpResponse::Ok().json(error_envelope::<()>(&e)),
    }
}

/// Remove a friendship, both directions.
#[delete("/{id}")]
async fn remove(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> impl Responder {
    let result = authenticated_user(&req, &state)
        .and_then(|user| state.store.delete_friend(*path, user.user_id));

    match result {
        Ok(()) => HttpResponse::Ok().json(RestResult::ok(())),
        Err(e) => HttpResponse::Ok().json(error_envelope::<()>(&e)),
    }
}

pub fn routes() -> Scope {
    web::scope("/v1/friends")
        .service(friends)
        .service(requests)
        .service(send_request)
        .service(resolve_request)
        .service(remove)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use sharegrid_common::error;

    use crate::auth::encode_jwt_token;
    use crate::config::Configuration;
    use crate::middleware::Authentication;

    fn test_state() -> AppState {
        AppState::new(Configuration::default())
    }

    fn token_for(state: &AppState, username: &str) -> String {
        encode_jwt_token(username, &state.configuration.token_secret_key(), 3600).unwrap()
    }

    #[actix_web::test]
    async fn test_request_lifecycle() {
        let state = test_state();
        state.store.signup("alice", "wonder").unwrap();
        let bob = state.store.signup("bob", "builder").unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .wrap(Authentication)
                .service(routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/v1/friends/requests")
            .insert_header(("accessToken", token_for(&state, "alice")))
            .set_json(FriendRequestCreate { user_id: bob.user_id })
            .to_request();
        let sent: RestResult<FriendRequestView> = test::call_and_read_body_json(&app, req).await;
        let sent = sent.into_data().unwrap();

        let req = test::TestRequest::get()
            .uri("/v1/friends/requests")
            .insert_header(("accessToken", token_for(&state, "bob")))
            .to_request();
        let pending: RestResult<Vec<FriendRequestView>> =
            test::call_and_read_body_json(&app, req).await;
        assert_eq!(pending.into_data().unwrap().len(), 1);

        let req = test::TestRequest::post()
            .uri(&format!("/v1/friends/requests/{}/resolve", sent.request_id))
            .insert_header(("accessToken", token_for(&state, "bob")))
            .set_json(FriendRequestResolution {
                response: "accept".into(),
            })
            .to_request();
        let resolved: RestResult<()> = test::call_and_read_body_json(&app, req).await;
        assert!(resolved.is_ok());

        let req = test::TestRequest::get()
            .uri("/v1/friends")
            .insert_header(("accessToken", token_for(&state, "alice")))
            .to_request();
        let listed: RestResult<Vec<FriendView>> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.into_data().unwrap()[0].username, "bob");
    }

    #[actix_web::test]
    async fn test_only_recipient_may_resolve() {
        let state = test_state();
        let alice = state.store.signup("alice", "wonder").unwrap();
        let bob = state.store.signup("bob", "builder").unwrap();
        let sent = state
            .store
            .send_friend_request(alice.user_id, bob.user_id)
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .wrap(Authentication)
                .service(routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/v1/friends/requests/{}/resolve", sent.request_id))
            .insert_header(("accessToken", token_for(&state, "alice")))
            .set_json(FriendRequestResolution {
                response: "accept".into(),
            })
            .to_request();
        let result: RestResult<()> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(result.code, error::ACCESS_DENIED.code);
    }

    #[actix_web::test]
    async fn test_bad_resolution_value() {
        let state = test_state();
        let alice = state.store.signup("alice", "wonder").unwrap();
        let bob = state.store.signup("bob", "builder").unwrap();
        let sent = state
            .store
            .send_friend_request(alice.user_id, bob.user_id)
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .wrap(Authentication)
                .service(routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/v1/friends/requests/{}/resolve", sent.request_id))
            .insert_header(("accessToken", token_for(&state, "bob")))
            .set_json(FriendRequestResolution {
                response: "maybe".into(),
            })
            .to_request();
        let result: RestResult<()> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(result.code, error::PARAMETER_VALIDATE_ERROR.code);
    }
}
