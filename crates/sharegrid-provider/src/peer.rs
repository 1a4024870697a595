//! Provider-to-provider HTTP API.
//!
//! Serves certificate exchanges and signed file fetches under `/v1/peer`.
//! Every inbound request is checked against the registry-backed trust chain
//! before any file content leaves the provider.

use std::sync::Arc;

use actix_web::{App, HttpResponse, HttpServer, Responder, Scope, dev::Server, post, web};
use secp256k1::PublicKey;
use tracing::{info, warn};

use sharegrid_api::PEER_PATH;
use sharegrid_api::model::{Certificate, FetchTicket};
use sharegrid_api::response::RestResult;
use sharegrid_client::TrustStore;
use sharegrid_common::crypto::SigningIdentity;
use sharegrid_common::error;

use crate::files::FileStore;

/// Shared state of the peer API.
#[derive(Clone)]
pub struct PeerState {
    pub identity: Arc<SigningIdentity>,
    /// Our own registry-signed certificate, returned on exchange
    pub certificate: Certificate,
    pub registry_key: PublicKey,
    /// Shared with the outbound peer client
    pub trust: TrustStore,
    pub store: Arc<FileStore>,
}

/// Certificate exchange: admit the peer's certificate, reply with ours.
#[post("/certificate")]
async fn exchange_certificate(
    state: web::Data<PeerState>,
    body: web::Json<Certificate>,
) -> impl Responder {
    let peer_certificate = body.into_inner();
    let peer_name = peer_certificate.name.clone();

    match state.trust.admit(peer_certificate, &state.registry_key) {
        Ok(()) => {
            info!(name = %peer_name, "Certificate exchange completed");
            HttpResponse::Ok().json(RestResult::ok(state.certificate.clone()))
        }
        Err(e) => {
            warn!(name = %peer_name, "Certificate exchange refused: {}", e);
            HttpResponse::Ok().json(RestResult::<Certificate>::err(
                error::CERTIFICATE_INVALID.code,
                &e.to_string(),
            ))
        }
    }
}

/// Signed file fetch: verify the ticket, fill in the content, re-sign.
#[post("/fetch")]
async fn fetch_file(state: web::Data<PeerState>, body: web::Json<FetchTicket>) -> impl Responder {
    let mut ticket = body.into_inner();

    let requester_key = match state.trust.peer_key(ticket.requester_id) {
        Ok(key) => key,
        Err(e) => {
            warn!(requester_id = ticket.requester_id, "Fetch refused: {}", e);
            return HttpResponse::Ok().json(RestResult::<FetchTicket>::err(
                error::ACCESS_DENIED.code,
                &format!("requester {} is not trusted", ticket.requester_id),
            ));
        }
    };

    if !ticket.verify(&requester_key) {
        warn!(
            requester_id = ticket.requester_id,
            file_id = ticket.descriptor.file_id,
            "Fetch ticket signature does not verify"
        );
        return HttpResponse::Ok().json(RestResult::<FetchTicket>::err(
            error::SIGNATURE_INVALID.code,
            error::SIGNATURE_INVALID.message,
        ));
    }

    let Some(descriptor) = state.store.by_id(ticket.descriptor.file_id) else {
        return HttpResponse::Ok().json(RestResult::<FetchTicket>::err(
            error::FILE_NOT_FOUND.code,
            &format!("file {} not published here", ticket.descriptor.file_id),
        ));
    };

    match state.store.load_buffer(descriptor) {
        Ok(buffer) => {
            info!(
                requester_id = ticket.requester_id,
                file_id = descriptor.file_id,
                name = %descriptor.name,
                "Serving file fetch"
            );
            ticket.descriptor = descriptor.clone();
            ticket.lines = buffer.lines;
            ticket.sign(&state.identity);
            HttpResponse::Ok().json(RestResult::ok(ticket))
        }
        Err(e) => {
            warn!(file_id = descriptor.file_id, "Failed to load file: {}", e);
            HttpResponse::Ok().json(RestResult::<FetchTicket>::err(
                error::SERVER_ERROR.code,
                error::SERVER_ERROR.message,
            ))
        }
    }
}

pub fn routes() -> Scope {
    web::scope(PEER_PATH)
        .service(exchange_certificate)
        .service(fetch_file)
}

/// Creates and binds the peer HTTP server.
pub fn peer_server(state: PeerState, address: &str, port: u16) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(routes())
    })
    .bind((address.to_string(), port))?
    .run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    use actix_web::test;

    use crate::users::User;

    struct Fixture {
        _home: tempfile::TempDir,
        registry: SigningIdentity,
        state: PeerState,
    }

    fn fixture() -> Fixture {
        let home = tempfile::tempdir().unwrap();
        fs::write(home.path().join("notes.txt"), "meeting notes\nitem one\n").unwrap();

        let mut users = HashMap::new();
        users.insert(
            "alice".to_string(),
            User {
                name: "alice".to_string(),
                password_hash: String::new(),
                home_dir: home.path().to_path_buf(),
            },
        );

        let registry = SigningIdentity::generate();
        let identity = Arc::new(SigningIdentity::generate());

        let mut certificate = Certificate::new(
            "provider-a".to_string(),
            "127.0.0.1:9001".to_string(),
            identity.public_key_hex(),
        );
        certificate.provider_id = 1;
        certificate.sign(&registry);

        let mut store = FileStore::load(&users).unwrap();
        store.assign_provider(1);
        let published = store
            .all()
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, mut f)| {
                f.file_id = i as u64 + 1;
                f
            })
            .collect();
        store.set_published(published);

        let state = PeerState {
            identity,
            certificate,
            registry_key: registry.public_key(),
            trust: TrustStore::new(),
            store: Arc::new(store),
        };

        Fixture {
            _home: home,
            registry,
            state,
        }
    }

    fn trusted_requester(fixture: &Fixture, provider_id: u64) -> SigningIdentity {
        let requester = SigningIdentity::generate();
        let mut certificate = Certificate::new(
            "provider-b".to_string(),
            "127.0.0.1:9002".to_string(),
            requester.public_key_hex(),
        );
        certificate.provider_id = provider_id;
        certificate.sign(&fixture.registry);
        fixture
            .state
            .trust
            .admit(certificate, &fixture.registry.public_key())
            .unwrap();
        requester
    }

    #[actix_web::test]
    async fn test_certificate_exchange() {
        let fixture = fixture();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture.state.clone()))
                .service(routes()),
        )
        .await;

        let peer = SigningIdentity::generate();
        let mut peer_certificate = Certificate::new(
            "provider-b".to_string(),
            "127.0.0.1:9002".to_string(),
            peer.public_key_hex(),
        );
        peer_certificate.provider_id = 2;
        peer_certificate.sign(&fixture.registry);

        let req = test::TestRequest::post()
            .uri("/v1/peer/certificate")
            .set_json(&peer_certificate)
            .to_request();
        let result: RestResult<Certificate> = test::call_and_read_body_json(&app, req).await;

        let ours = result.into_data().unwrap();
        assert_eq!(ours.name, "provider-a");
        assert!(fixture.state.trust.contains(2));
    }

    #[actix_web::test]
    async fn test_certificate_exchange_rejects_forged() {
        let fixture = fixture();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture.state.clone()))
                .service(routes()),
        )
        .await;

        let impostor_registry = SigningIdentity::generate();
        let peer = SigningIdentity::generate();
        let mut forged = Certificate::new(
            "provider-b".to_string(),
            "127.0.0.1:9002".to_string(),
            peer.public_key_hex(),
        );
        forged.provider_id = 2;
        forged.sign(&impostor_registry);

        let req = test::TestRequest::post()
            .uri("/v1/peer/certificate")
            .set_json(&forged)
            .to_request();
        let result: RestResult<Certificate> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(result.code, error::CERTIFICATE_INVALID.code);
        assert!(!fixture.state.trust.contains(2));
    }

    #[actix_web::test]
    async fn test_fetch_returns_signed_content() {
        let fixture = fixture();
        let requester = trusted_requester(&fixture, 2);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture.state.clone()))
                .service(routes()),
        )
        .await;

        let descriptor = fixture.state.store.by_id(1).unwrap().clone();
        let mut ticket = FetchTicket::new(descriptor, 2, "bob".to_string());
        ticket.sign(&requester);

        let req = test::TestRequest::post()
            .uri("/v1/peer/fetch")
            .set_json(&ticket)
            .to_request();
        let result: RestResult<FetchTicket> = test::call_and_read_body_json(&app, req).await;

        let reply = result.into_data().unwrap();
        assert_eq!(reply.lines, vec!["meeting notes", "item one"]);
        assert!(reply.verify(&fixture.state.identity.public_key()));
    }

    #[actix_web::test]
    async fn test_fetch_refuses_untrusted_requester() {
        let fixture = fixture();
        let stranger = SigningIdentity::generate();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture.state.clone()))
                .service(routes()),
        )
        .await;

        let descriptor = fixture.state.store.by_id(1).unwrap().clone();
        let mut ticket = FetchTicket::new(descriptor, 9, "mallory".to_string());
        ticket.sign(&stranger);

        let req = test::TestRequest::post()
            .uri("/v1/peer/fetch")
            .set_json(&ticket)
            .to_request();
        let result: RestResult<FetchTicket> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(result.code, error::ACCESS_DENIED.code);
    }

    #[actix_web::test]
    async fn test_fetch_refuses_bad_signature() {
        let fixture = fixture();
        let _requester = trusted_requester(&fixture, 2);
        let other = SigningIdentity::generate();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture.state.clone()))
                .service(routes()),
        )
        .await;

        // Signed by a key that does not match the trusted certificate.
        let descriptor = fixture.state.store.by_id(1).unwrap().clone();
        let mut ticket = FetchTicket::new(descriptor, 2, "bob".to_string());
        ticket.sign(&other);

        let req = test::TestRequest::post()
            .uri("/v1/peer/fetch")
            .set_json(&ticket)
            .to_request();
        let result: RestResult<FetchTicket> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(result.code, error::SIGNATURE_INVALID.code);
    }

    #[actix_web::test]
    async fn test_fetch_unknown_file() {
        let fixture = fixture();
        let requester = trusted_requester(&fixture, 2);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture.state.clone()))
                .service(routes()),
        )
        .await;

        let mut descriptor = fixture.state.store.by_id(1).unwrap().clone();
        descriptor.file_id = 77;
        let mut ticket = FetchTicket::new(descriptor, 2, "bob".to_string());
        ticket.sign(&requester);

        let req = test::TestRequest::post()
            .uri("/v1/peer/fetch")
            .set_json(&ticket)
            .to_request();
        let result: RestResult<FetchTicket> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(result.code, error::FILE_NOT_FOUND.code);
    }
}
