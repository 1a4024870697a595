//! Server startup: HTTP binding, logging and shutdown handling.

pub mod http;
pub mod logging;
pub mod shutdown;

pub use http::registry_server;
pub use logging::{LoggingConfig, init_logging};
pub use shutdown::wait_for_shutdown_signal;
