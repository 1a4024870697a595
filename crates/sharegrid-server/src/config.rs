//! Configuration management for the registry server
//!
//! Configuration is layered: `conf/registry.yml` (optional), environment
//! variables with the `SHAREGRID` prefix, and command line overrides, in
//! increasing precedence.

use clap::Parser;
use config::{Config, Environment};

const DEFAULT_SERVER_PORT: u16 = 8850;

/// Command line arguments for the registry server
#[derive(Debug, Parser)]
#[command(name = "sharegrid-server", about = "Sharegrid central registry server")]
struct Cli {
    #[arg(short = 'a', long = "address")]
    address: Option<String>,
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
    #[arg(short = 'n', long = "name")]
    name: Option<String>,
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
            .add_source(config::File::with_name("conf/registry").required(false));

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
        if let Some(v) = args.name {
            config_builder = config_builder
                .set_override("registry.name", v)
                .expect("Failed to set registry name override");
        }
        if let Some(v) = args.log_dir {
            config_builder = config_builder
                .set_override("logging.dir", v)
                .expect("Failed to set log dir override");
        }

        let app_config = config_builder
            .build()
            .expect("Failed to build configuration - check conf/registry.yml");

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

    /// Name the registry presents in its own certificate.
    pub fn registry_name(&self) -> String {
        self.config
            .get_string("registry.name")
            .unwrap_or("central-registry".to_string())
    }

    /// Address the registry advertises to providers, `host:port`.
    pub fn advertised_address(&self) -> String {
        self.config
            .get_string("server.advertisedAddress")
            .unwrap_or_else(|_| format!("{}:{}", self.server_address(), self.server_port()))
    }

    pub fn logging_config(&self) -> crate::startup::LoggingConfig {
        crate::startup::LoggingConfig::from_settings(
            self.config.get_string("logging.dir").ok(),
            self.config.get_bool("logging.console").unwrap_or(true),
            self.config.get_bool("logging.file").unwrap_or(true),
            self.config
                .get_string("logging.level")
                .unwrap_or("info".to_string()),
        )
    }
}
