//! Main entry point for the Sharegrid service provider.
//!
//! Registers with the central registry, publishes the users' files, starts
//! the peer HTTP server in the background and hands the terminal over to
//! the interactive shell.

mod files;
mod peer;
mod shell;
mod users;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use sharegrid_api::model::Certificate;
use sharegrid_client::{ClientConfig, PeerClient, RegistryClient, TrustStore};
use sharegrid_common::crypto::SigningIdentity;

/// Command line arguments for the service provider
#[derive(Debug, Parser)]
#[command(name = "sharegrid-provider", about = "Sharegrid file sharing provider")]
struct Cli {
    /// Provider name, ends up in the certificate
    name: String,
    /// Address of the peer API, host:port
    #[arg(short, long, default_value = "127.0.0.1:9001")]
    address: String,
    /// Address of the central registry, host:port
    #[arg(short, long, default_value = "127.0.0.1:8850")]
    registry: String,
    /// Users file, one "username password_hash home_dir" per line
    #[arg(short, long, default_value = "conf/users.conf")]
    users: PathBuf,
    #[arg(long = "log-dir", env = "SHAREGRID_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

/// File-only logging: console output would interleave with the shell.
fn init_logging(log_dir: Option<PathBuf>) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    let log_dir = log_dir.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(format!("{}/sharegrid/logs", home))
    });
    std::fs::create_dir_all(&log_dir)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "provider.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false),
        )
        .with(filter)
        .try_init()?;

    Ok(guard)
}

fn split_address(address: &str) -> anyhow::Result<(String, u16)> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| anyhow::anyhow!("address '{}' is not host:port", address))?;
    Ok((host.to_string(), port.parse()?))
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let _logging_guard =
        init_logging(args.log_dir.clone()).map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("Initializing service provider {}...", args.name);
    println!("\t{:<15}: {}", "Address", args.address);
    println!("\t{:<15}: {}", "Registry", args.registry);
    println!("\t{:<15}: {}", "Users file", args.users.display());

    println!("\nLoading users...");
    let users = users::load_users(&args.users)?;
    println!("\t{:<10} {}", "Username", "Home directory");
    for user in users.values() {
        println!("\t{:<10} {}", user.name, user.home_dir.display());
    }

    println!("\nLoading files...");
    let mut store = files::FileStore::load(&users)?;
    for file in store.all() {
        println!("\t{}", file.name);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let identity = Arc::new(SigningIdentity::generate());
    let config = ClientConfig::new(&args.registry);
    let registry_client = RegistryClient::new(config.clone())?;

    println!("\nQuerying registry for its certificate...");
    let registry_certificate = runtime.block_on(registry_client.registry_certificate())?;
    println!(
        "Received certificate for central registry {}",
        registry_certificate.name
    );
    let registry_key = registry_certificate.holder_key()?;

    println!("Requesting certificate signature for {}...", args.name);
    let unsigned = Certificate::new(
        args.name.clone(),
        args.address.clone(),
        identity.public_key_hex(),
    );
    let certificate =
        runtime.block_on(registry_client.sign_certificate(&unsigned, &registry_key))?;
    println!(
        "Received certificate signed by {}, provider id {}\n",
        registry_certificate.name, certificate.provider_id
    );
    info!(
        provider_id = certificate.provider_id,
        name = %args.name,
        "Registered with central registry"
    );

    println!(
        "Publishing files on central registry {}...",
        registry_certificate.name
    );
    store.assign_provider(certificate.provider_id);
    let published = runtime.block_on(registry_client.publish_files(store.all()))?;
    println!("The files were successfully published\n");
    store.set_published(published);

    let trust = TrustStore::new();
    let peer_client = PeerClient::new(&config, registry_key, trust.clone())?;

    let store = Arc::new(store);
    let state = peer::PeerState {
        identity: identity.clone(),
        certificate: certificate.clone(),
        registry_key,
        trust,
        store: store.clone(),
    };

    let (host, port) = split_address(&args.address)?;
    let server = peer::peer_server(state, &host, port)?;
    let server_handle = server.handle();
    std::thread::spawn(move || {
        if let Err(e) = actix_web::rt::System::new().block_on(server) {
            error!("Peer server terminated: {}", e);
        }
    });
    info!("Peer HTTP server listening on {}:{}", host, port);

    let mut shell = shell::Shell::new(
        users,
        store,
        identity,
        certificate,
        registry_client,
        peer_client,
        runtime.handle().clone(),
    );
    shell.run()?;

    println!("{}", "-".repeat(80));
    println!("Shutting down service provider...");
    runtime.block_on(server_handle.stop(true));
    println!("Shutdown completed for {}", args.name);

    Ok(())
}
