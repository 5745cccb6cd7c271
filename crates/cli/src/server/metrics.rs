use anchor_dns_application::ports::MetricsReporter;
use anchor_dns_application::services::MetricsServerWrapper;
use anchor_dns_domain::config::MetricsConfig;
use anchor_dns_domain::ServerError;
use anchor_dns_infrastructure::metrics::{DnsMetrics, PrometheusExporter};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Starts the metrics exporter in the background.
///
/// A failing exporter cancels `shutdown` so the whole process stops with it.
pub fn start_metrics_server(
    config: &MetricsConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<(Arc<dyn MetricsReporter>, JoinHandle<Result<(), ServerError>>)> {
    let metrics = Arc::new(DnsMetrics::new()?);
    let exporter = Arc::new(PrometheusExporter::new(config.address.as_str(), metrics));
    let wrapper = Arc::new(MetricsServerWrapper::new(exporter));
    let reporter = wrapper.metrics_reporter();

    let task = tokio::spawn(async move {
        let result = wrapper.run(shutdown.clone()).await;
        if let Err(ref e) = result {
            error!(error = %e, "Metrics server failed");
            shutdown.cancel();
        }
        result
    });

    Ok((reporter, task))
}
