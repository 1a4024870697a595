//! Configuration management for the Picshare backend.
//!
//! Configuration is layered: `conf/picshare.yml` (optional), environment
//! variables with the `SHAREGRID` prefix, and command line overrides, in
//! increasing precedence.

use clap::Parser;
use config::{Config, Environment};

use crate::auth::DEFAULT_TOKEN_EXPIRE_SECONDS;

const DEFAULT_SERVER_PORT: u16 = 8860;

// base64 of a 48-byte development key; deployments must override it
const DEFAULT_TOKEN_SECRET_KEY: &str =
    "U2hhcmVncmlkUGljc2hhcmVUb2tlblNlY3JldEtleTAxMjM0NTY3ODkwMTIzNDU=";

/// Command line arguments for the Picshare server
#[derive(Debug, Parser)]
#[command(name = "sharegrid-picshare", about = "Sharegrid picture sharing backend")]
struct Cli {
    #[arg(short = 'a', long = "address")]
    address: Option<String>,
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
    #[arg(short = 'm', long = "media-dir")]
    media_dir: Option<String>,
    #[arg(long = "log-dir", env = "SHAREGRID_LOG_DIR")]
    log_dir: Option<String>,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Self {
        let args = Cli::parse();
        let mut config_builder = Config::builder()
            .add_source(
                Environment::with_prefix("sharegrid")
                    .separator(".")
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("conf/picshare").required(false));

        if let Some(v) = args.address {
            config_builder = config_builder
                .set_override("server.address", v)
                .expect("Failed to set address override");
        }
        if let Some(v) = args.port {
            config_builder = config_builder
                .set_override("server.port", v)
                .expect("Failed to set port override");
        }
        if let Some(v) = args.media_dir {
            config_builder = config_builder
                .set_override("media.dir", v)
                .expect("Failed to set media dir override");
        }
        if let Some(v) = args.log_dir {
            config_builder = config_builder
                .set_override("logging.dir", v)
                .expect("Failed to set log dir override");
        }

        let app_config = config_builder
            .build()
            .expect("Failed to build configuration - check conf/picshare.yml");

        Configuration { config: app_config }
    }

    pub fn server_address(&self) -> String {
        self.config
            .get_string("server.address")
            .unwrap_or("0.0.0.0".to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int("server.port")
            .unwrap_or(DEFAULT_SERVER_PORT.into()) as u16
    }

    /// Base64-encoded HS256 secret used to sign access tokens.
    pub fn token_secret_key(&self) -> String {
        self.config
            .get_string("auth.tokenSecretKey")
            .unwrap_or(DEFAULT_TOKEN_SECRET_KEY.to_string())
    }

    pub fn token_ttl_seconds(&self) -> i64 {
        self.config
            .get_int("auth.tokenTtlSeconds")
            .unwrap_or(DEFAULT_TOKEN_EXPIRE_SECONDS)
    }

    /// Directory where uploaded pictures are stored.
    pub fn media_dir(&self) -> String {
        self.config
            .get_string("media.dir")
            .unwrap_or("media".to_string())
    }

    pub fn log_dir(&self) -> Option<String> {
        self.config.get_string("logging.dir").ok()
    }

    pub fn log_level(&self) -> String {
        self.config
            .get_string("logging.level")
            .unwrap_or("info".to_string())
    }
}
