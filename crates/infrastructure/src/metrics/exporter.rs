use anchor_dns_application::ports::{MetricsExporter, PluginHandler, ResponseWriter};
use anchor_dns_domain::{Protocol, QueryContext, ServeStatus, ServerError};
use async_trait::async_trait;
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::http::create_metrics_routes;
use super::{rcode_label, DnsMetrics, RecordingWriter};

struct RunningEndpoint {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<std::io::Result<()>>,
}

/// Exposes query counters over HTTP and instruments every query served
/// through it.
///
/// The registry is the only state shared between requests; the downstream
/// stage is passed per call.
pub struct PrometheusExporter {
    listen_address: String,
    metrics: Arc<DnsMetrics>,
    endpoint: Mutex<Option<RunningEndpoint>>,
}

impl PrometheusExporter {
    pub fn new(listen_address: impl Into<String>, metrics: Arc<DnsMetrics>) -> Self {
        Self {
            listen_address: listen_address.into(),
            metrics,
            endpoint: Mutex::new(None),
        }
    }

    pub fn metrics(&self) -> &Arc<DnsMetrics> {
        &self.metrics
    }

    /// Address the HTTP endpoint is bound to while running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.endpoint.lock().await.as_ref().map(|e| e.local_addr)
    }
}

#[async_trait]
impl MetricsExporter for PrometheusExporter {
    async fn startup(&self) -> Result<(), ServerError> {
        let mut endpoint = self.endpoint.lock().await;
        if endpoint.is_some() {
            return Err(ServerError::exporter(
                "starting the metrics listener",
                "metrics endpoint already running",
            ));
        }

        let listener = tokio::net::TcpListener::bind(self.listen_address.as_str())
            .await
            .map_err(|source| ServerError::TransportBind {
                protocol: Protocol::Tcp,
                address: self.listen_address.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Transport {
            protocol: Protocol::Tcp,
            source,
        })?;

        let shutdown = CancellationToken::new();
        let app = create_metrics_routes(Arc::clone(&self.metrics));
        let signal = shutdown.clone().cancelled_owned();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
        });

        info!(address = %local_addr, "Metrics endpoint listening");
        *endpoint = Some(RunningEndpoint {
            local_addr,
            shutdown,
            handle,
        });
        Ok(())
    }

    async fn final_shutdown(&self) -> Result<(), ServerError> {
        let Some(endpoint) = self.endpoint.lock().await.take() else {
            debug!("Metrics endpoint not running, nothing to stop");
            return Ok(());
        };

        endpoint.shutdown.cancel();
        match endpoint.handle.await {
            Ok(Ok(())) => {
                info!(address = %endpoint.local_addr, "Metrics endpoint stopped");
                Ok(())
            }
            Ok(Err(source)) => Err(ServerError::Transport {
                protocol: Protocol::Tcp,
                source,
            }),
            Err(e) => Err(ServerError::exporter("joining the metrics endpoint task", e)),
        }
    }

    async fn serve(
        &self,
        next: &dyn PluginHandler,
        ctx: &QueryContext,
        writer: &mut dyn ResponseWriter,
        message: &[u8],
    ) -> Result<ServeStatus, ServerError> {
        let proto = ctx.protocol.as_str();
        self.metrics.record_request(proto, &query_type(message));

        let mut recorder = RecordingWriter::new(writer);
        let result = next.serve(ctx, &mut recorder, message).await;

        self.metrics
            .observe_duration(proto, ctx.received_at.elapsed().as_secs_f64());

        match &result {
            Ok(status) if status.is_handled() => {
                if let Some(rcode) = recorder.rcode() {
                    self.metrics.record_response(rcode_label(rcode));
                }
            }
            Ok(status) => self.metrics.record_response(rcode_label(status.code())),
            Err(e) => {
                self.metrics.record_error(proto);
                warn!(stage = next.name(), peer = %ctx.peer, error = %e, "Handler chain failed");
            }
        }

        result
    }
}

/// Query type of the first question, `"unknown"` when the payload does not parse.
fn query_type(message: &[u8]) -> String {
    Message::from_vec(message)
        .ok()
        .and_then(|m| m.queries().first().map(|q| q.query_type().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
