//! Main entry point for the Picshare backend.
//!
//! Sets up configuration, logging and the HTTP server. Actix handles
//! SIGINT itself and drains in-flight requests on shutdown.

mod api;
mod auth;
mod config;
mod middleware;
mod model;
mod state;
mod store;

use actix_web::{App, HttpServer, web};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::state::AppState;

/// Console plus a daily-rotated `picshare.log`. The returned guard must
/// stay alive so buffered output gets flushed.
fn init_logging(
    configuration: &config::Configuration,
) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let log_dir = configuration.log_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{}/sharegrid/logs", home)
    });
    std::fs::create_dir_all(&log_dir)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "picshare.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let level = configuration.log_level();
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.clone()));
    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_filter(console_filter))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .try_init()?;

    Ok(guard)
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = config::Configuration::new();
    let _logging_guard = init_logging(&configuration)?;

    let address = configuration.server_address();
    let port = configuration.server_port();
    let media_dir = configuration.media_dir();
    std::fs::create_dir_all(&media_dir)?;

    let app_state = AppState::new(configuration);
    let data = web::Data::new(app_state);

    info!("Picshare HTTP server listening on {}:{}", address, port);
    info!("Uploaded pictures stored under {}", media_dir);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(actix_web::middleware::Logger::default())
            .wrap(middleware::Authentication)
            .service(api::auth::routes())
            .service(api::user::routes())
            .service(api::picture::routes())
            .service(api::friend::routes())
    })
    .bind((address.as_str(), port))?
    .run()
    .await?;

    info!("Shutdown complete");
    Ok(())
}
