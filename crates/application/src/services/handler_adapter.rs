use anchor_dns_domain::{QueryContext, ServeStatus, ServerError};
use async_trait::async_trait;
use std::sync::Arc;

use crate::ports::{DnsHandler, PluginHandler, ResponseWriter};

/// Presents a plain `DnsHandler` as the status-returning stage the exporter
/// calls. Built per request and never shared between requests.
pub struct HandlerAdapter {
    handler: Arc<dyn DnsHandler>,
}

impl HandlerAdapter {
    pub fn new(handler: Arc<dyn DnsHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl PluginHandler for HandlerAdapter {
    fn name(&self) -> &str {
        "handler_adapter"
    }

    async fn serve(
        &self,
        _ctx: &QueryContext,
        writer: &mut dyn ResponseWriter,
        message: &[u8],
    ) -> Result<ServeStatus, ServerError> {
        self.handler.handle(writer, message).await;
        Ok(ServeStatus::HANDLED)
    }
}
