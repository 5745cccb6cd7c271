//! Anchor DNS Application Layer
//!
//! Ports describe the transport and metrics collaborators; services compose
//! them into the startup orchestrator and the instrumented handler chain.
pub mod ports;
pub mod services;
