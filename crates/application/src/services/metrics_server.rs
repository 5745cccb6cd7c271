use anchor_dns_domain::{QueryContext, ServeStatus, ServerError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::handler_adapter::HandlerAdapter;
use crate::ports::{DnsHandler, MetricsExporter, MetricsReporter, ResponseWriter};

/// Owns the metrics exporter lifecycle and bridges the handler chain into it.
pub struct MetricsServerWrapper {
    exporter: Arc<dyn MetricsExporter>,
    ran: AtomicBool,
}

impl MetricsServerWrapper {
    pub fn new(exporter: Arc<dyn MetricsExporter>) -> Self {
        Self {
            exporter,
            ran: AtomicBool::new(false),
        }
    }

    pub fn metrics_reporter(self: &Arc<Self>) -> Arc<dyn MetricsReporter> {
        Arc::clone(self) as Arc<dyn MetricsReporter>
    }

    /// Starts the exporter, waits for `shutdown`, then tears it down.
    ///
    /// Single shot: a second call fails without touching the exporter.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), ServerError> {
        if self.ran.swap(true, Ordering::AcqRel) {
            return Err(ServerError::exporter(
                "metrics server already ran",
                "run may only be called once per wrapper",
            ));
        }

        self.exporter
            .startup()
            .await
            .map_err(|e| ServerError::exporter("setting up the metrics listener", e))?;
        info!("Metrics listener started");

        shutdown.cancelled().await;

        self.exporter
            .final_shutdown()
            .await
            .map_err(|e| ServerError::exporter("tearing down the metrics listener", e))?;
        info!("Metrics listener stopped");

        Ok(())
    }
}

#[async_trait]
impl MetricsReporter for MetricsServerWrapper {
    async fn report(
        &self,
        next: Arc<dyn DnsHandler>,
        ctx: &QueryContext,
        writer: &mut dyn ResponseWriter,
        message: &[u8],
    ) -> Result<ServeStatus, ServerError> {
        let adapter = HandlerAdapter::new(next);
        self.exporter.serve(&adapter, ctx, writer, message).await
    }
}
