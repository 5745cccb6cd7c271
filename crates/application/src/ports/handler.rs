use anchor_dns_domain::{Protocol, QueryContext, ServeStatus, ServerError};
use async_trait::async_trait;
use std::net::SocketAddr;

/// Per-request response sink owned by the transport.
///
/// A writer is only borrowed for the duration of one request and must not be
/// retained by handlers.
#[async_trait]
pub trait ResponseWriter: Send {
    /// Sends one response message back to the peer.
    async fn write(&mut self, message: &[u8]) -> std::io::Result<()>;

    fn protocol(&self) -> Protocol;

    fn peer_addr(&self) -> SocketAddr;
}

/// A stage of the handler chain.
///
/// Handlers emit zero or one response through the writer and report nothing
/// back to the caller.
#[async_trait]
pub trait DnsHandler: Send + Sync {
    async fn handle(&self, writer: &mut dyn ResponseWriter, message: &[u8]);
}

/// Status-returning handler shape expected by the metrics exporter.
#[async_trait]
pub trait PluginHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn serve(
        &self,
        ctx: &QueryContext,
        writer: &mut dyn ResponseWriter,
        message: &[u8],
    ) -> Result<ServeStatus, ServerError>;
}
