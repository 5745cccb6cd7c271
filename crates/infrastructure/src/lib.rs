//! Anchor DNS Infrastructure Layer
//!
//! Concrete tokio transports, the network connector used by readiness probes
//! and the Prometheus metrics exporter.
pub mod dns;
pub mod metrics;
