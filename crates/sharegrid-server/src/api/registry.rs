//! Registry API endpoints.
//!
//! Certificate issuance, file publication and directory listings, all under
//! the `/v1/registry` scope.

use actix_web::{HttpResponse, Responder, Scope, get, post, web};
use tracing::warn;

use sharegrid_api::REGISTRY_PATH;
use sharegrid_api::model::{Certificate, FileDescriptor};
use sharegrid_api::response::RestResult;
use sharegrid_registry::RegistryService;

use super::error_envelope;

/// The registry's own certificate, carrying its public key.
#[get("/certificate")]
async fn certificate(service: web::Data<RegistryService>) -> impl Responder {
    web::Json(RestResult::ok(service.certificate()))
}

/// Sign a provider certificate, assigning it a provider id.
#[post("/certificate")]
async fn sign_certificate(
    service: web::Data<RegistryService>,
    body: web::Json<Certificate>,
) -> impl Responder {
    match service.sign_certificate(body.into_inner()) {
        Ok(signed) => HttpResponse::Ok().json(RestResult::ok(signed)),
        Err(e) => {
            warn!("Certificate signing rejected: {}", e);
            HttpResponse::Ok().json(error_envelope::<Certificate>(&e))
        }
    }
}

/// Publish file descriptors, assigning file ids.
#[post("/files")]
async fn publish_files(
    service: web::Data<RegistryService>,
    body: web::Json<Vec<FileDescriptor>>,
) -> impl Responder {
    match service.publish_files(body.into_inner()) {
        Ok(published) => HttpResponse::Ok().json(RestResult::ok(published)),
        Err(e) => {
            warn!("File publication rejected: {}", e);
            HttpResponse::Ok().json(error_envelope::<Vec<FileDescriptor>>(&e))
        }
    }
}

/// Directory of registered providers.
#[get("/providers")]
async fn providers(service: web::Data<RegistryService>) -> impl Responder {
    web::Json(RestResult::ok(service.providers()))
}

/// Directory of published files.
#[get("/files")]
async fn files(service: web::Data<RegistryService>) -> impl Responder {
    web::Json(RestResult::ok(service.published_files()))
}

#[get("/health")]
async fn health() -> impl Responder {
    web::Json(RestResult::ok("UP".to_string()))
}

pub fn routes() -> Scope {
    web::scope(REGISTRY_PATH)
        .service(certificate)
        .service(sign_certificate)
        .service(publish_files)
        .service(providers)
        .service(files)
        .service(health)
}
