//! Main entry point for the Sharegrid central registry server.
//!
//! Sets up configuration, logging and the registry HTTP server, then waits
//! for a shutdown signal.

mod api;
mod config;
mod startup;

use sharegrid_registry::RegistryService;
use tracing::info;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = config::Configuration::new();

    let logging_config = configuration.logging_config();
    let _logging_guard = startup::init_logging(&logging_config)?;

    let address = configuration.server_address();
    let port = configuration.server_port();
    let name = configuration.registry_name();
    let advertised = configuration.advertised_address();

    let service = RegistryService::new(&name, &advertised);
    info!(
        name = %name,
        address = %advertised,
        public_key = %service.certificate().public_key,
        "Registry identity generated"
    );

    let server = startup::registry_server(service, address.clone(), port)?;
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);
    info!("Registry HTTP server listening on {}:{}", address, port);

    let shutdown = startup::wait_for_shutdown_signal().await;
    let mut shutdown_rx = shutdown.subscribe();
    let _ = shutdown_rx.recv().await;

    info!("Stopping registry HTTP server...");
    server_handle.stop(true).await;
    let _ = server_task.await;
    info!("Shutdown complete");

    Ok(())
}
