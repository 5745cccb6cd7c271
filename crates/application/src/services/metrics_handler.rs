use anchor_dns_domain::QueryContext;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::ports::{DnsHandler, MetricsReporter, ResponseWriter};

/// Entry point of the handler chain: every query goes through the reporter,
/// which is responsible for calling `next`.
pub struct MetricsDnsHandler {
    reporter: Arc<dyn MetricsReporter>,
    next: Arc<dyn DnsHandler>,
}

impl MetricsDnsHandler {
    pub fn new(reporter: Arc<dyn MetricsReporter>, next: Arc<dyn DnsHandler>) -> Self {
        Self { reporter, next }
    }
}

#[async_trait]
impl DnsHandler for MetricsDnsHandler {
    async fn handle(&self, writer: &mut dyn ResponseWriter, message: &[u8]) {
        let ctx = QueryContext::new(writer.protocol(), writer.peer_addr());

        if let Err(e) = self
            .reporter
            .report(Arc::clone(&self.next), &ctx, writer, message)
            .await
        {
            warn!(
                error = %e,
                protocol = %ctx.protocol,
                peer = %ctx.peer,
                "Instrumented query failed"
            );
        }
    }
}
