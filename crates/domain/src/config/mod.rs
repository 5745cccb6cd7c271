//! Configuration module for Anchor DNS
//!
//! - `root`: Main configuration and CLI overrides
//! - `server`: DNS listener binding and startup bound
//! - `metrics`: Metrics exporter endpoint
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod errors;
pub mod logging;
pub mod metrics;
pub mod root;
pub mod server;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use metrics::MetricsConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
