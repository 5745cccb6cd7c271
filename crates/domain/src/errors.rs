use crate::Protocol;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {protocol} listener on {address}: {source}")]
    TransportBind {
        protocol: Protocol,
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{protocol} listener failed: {source}")]
    Transport {
        protocol: Protocol,
        #[source]
        source: std::io::Error,
    },

    #[error("{protocol} listener panicked: {message}")]
    ListenerPanicked { protocol: Protocol, message: String },

    #[error("Timed out after {timeout:?} waiting for server to bind")]
    StartupTimeout { timeout: Duration },

    #[error("Metrics exporter error while {context}: {source}")]
    ExporterLifecycle {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request handling failed: {0}")]
    RequestHandling(String),
}

impl ServerError {
    /// Wraps an exporter failure with a description of the lifecycle step.
    pub fn exporter(
        context: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ExporterLifecycle {
            context,
            source: source.into(),
        }
    }

    pub fn is_startup_timeout(&self) -> bool {
        matches!(self, Self::StartupTimeout { .. })
    }
}
