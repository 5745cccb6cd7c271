use anchor_dns_application::ports::DnsHandler;
use anchor_dns_application::services::DnsServer;
use anchor_dns_domain::config::ServerConfig;
use anchor_dns_domain::ServerError;
use anchor_dns_infrastructure::dns::{NetConnector, TcpListener, UdpListener};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Runs the TCP and UDP listeners until `shutdown` fires or startup fails.
pub async fn start_dns_server(
    config: &ServerConfig,
    handler: Arc<dyn DnsHandler>,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let bind_address = config.listen_address();
    info!(bind_address = %bind_address, "Starting DNS server");

    let server = DnsServer::new(
        Arc::new(
            TcpListener::new(bind_address.as_str(), Arc::clone(&handler))
                .with_idle_timeout(config.tcp_idle_timeout()),
        ),
        Arc::new(UdpListener::new(bind_address.as_str(), handler)),
        Arc::new(NetConnector::new()),
        config.startup_timeout(),
        bind_address,
    )
    .with_probe_retry_interval(config.probe_retry_interval())
    .with_probe_read_timeout(config.probe_read_timeout());

    server.listen_and_serve(shutdown).await
}
