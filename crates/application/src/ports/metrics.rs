use super::{DnsHandler, PluginHandler, ResponseWriter};
use anchor_dns_domain::{QueryContext, ServeStatus, ServerError};
use async_trait::async_trait;
use std::sync::Arc;

/// Records observability around a single invocation of `next`.
///
/// Implementations must invoke `next` exactly once per call and propagate its
/// outcome instead of swallowing it.
#[async_trait]
pub trait MetricsReporter: Send + Sync {
    async fn report(
        &self,
        next: Arc<dyn DnsHandler>,
        ctx: &QueryContext,
        writer: &mut dyn ResponseWriter,
        message: &[u8],
    ) -> Result<ServeStatus, ServerError>;
}

/// Process-wide metrics sub-service exposing counters over the network.
///
/// `serve` takes the downstream stage as an argument so that no per-request
/// state lives inside the exporter.
#[async_trait]
pub trait MetricsExporter: Send + Sync {
    async fn startup(&self) -> Result<(), ServerError>;

    async fn final_shutdown(&self) -> Result<(), ServerError>;

    async fn serve(
        &self,
        next: &dyn PluginHandler,
        ctx: &QueryContext,
        writer: &mut dyn ResponseWriter,
        message: &[u8],
    ) -> Result<ServeStatus, ServerError>;
}
