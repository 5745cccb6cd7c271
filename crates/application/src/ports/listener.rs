use anchor_dns_domain::{Protocol, ServerError};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A transport listener serving one protocol.
#[async_trait]
pub trait Listener: Send + Sync {
    fn protocol(&self) -> Protocol;

    /// Binds and serves until a fatal failure or until `shutdown` fires.
    ///
    /// Returns `Ok(())` only after `shutdown` was cancelled. Bind failures are
    /// reported as `ServerError::TransportBind`.
    async fn listen_and_serve(&self, shutdown: CancellationToken) -> Result<(), ServerError>;
}
