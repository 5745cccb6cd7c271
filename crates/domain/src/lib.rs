//! Anchor DNS Domain Layer
pub mod config;
pub mod errors;
pub mod query_context;
pub mod transport;

pub use config::{CliOverrides, Config, ConfigError};
pub use errors::ServerError;
pub use query_context::{QueryContext, ServeStatus};
pub use transport::{Protocol, TransportBinding};
