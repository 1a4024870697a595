//! HTTP server setup for the registry API.

use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use sharegrid_registry::RegistryService;

use crate::api;

/// Creates and binds the registry HTTP server.
pub fn registry_server(
    service: RegistryService,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(service.clone()))
            .service(api::registry::routes())
    })
    .bind((address, port))?
    .run())
}
