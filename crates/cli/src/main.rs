//! # Anchor DNS Server
//!
//! Main entry point: loads configuration, starts the metrics exporter and
//! the TCP/UDP listeners, and waits for Ctrl+C.

mod bootstrap;
mod server;

use anchor_dns_application::ports::DnsHandler;
use anchor_dns_application::services::MetricsDnsHandler;
use anchor_dns_domain::CliOverrides;
use anchor_dns_infrastructure::dns::RefusingHandler;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "anchor-dns")]
#[command(version)]
#[command(about = "DNS server daemon with readiness-checked startup and Prometheus metrics")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Bind address for the DNS listeners
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Listen address of the metrics endpoint
    #[arg(short = 'm', long)]
    metrics_address: Option<String>,

    /// Seconds to wait for both listeners to become ready
    #[arg(short = 't', long)]
    startup_timeout: Option<u64>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bind_address: self.bind.clone(),
            dns_port: self.dns_port,
            metrics_address: self.metrics_address.clone(),
            startup_timeout_secs: self.startup_timeout,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config);

    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        bind = %config.server.listen_address(),
        startup_timeout_secs = config.server.startup_timeout_secs,
        metrics_enabled = config.metrics.enabled,
        metrics_address = %config.metrics.address,
        "Configuration loaded"
    );

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C, shutting down"),
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
            }
            shutdown.cancel();
        });
    }

    let resolver: Arc<dyn DnsHandler> = Arc::new(RefusingHandler::new());
    let mut metrics_task = None;
    let handler: Arc<dyn DnsHandler> = if config.metrics.enabled {
        let (reporter, task) = server::start_metrics_server(&config.metrics, shutdown.clone())?;
        metrics_task = Some(task);
        Arc::new(MetricsDnsHandler::new(reporter, resolver))
    } else {
        resolver
    };

    let dns_result = server::start_dns_server(&config.server, handler, shutdown.clone()).await;
    shutdown.cancel();

    let metrics_result = match metrics_task {
        Some(task) => task.await?,
        None => Ok(()),
    };

    if let Err(e) = dns_result {
        error!(error = %e, "DNS server failed");
        return Err(e.into());
    }
    metrics_result?;

    info!("Anchor DNS stopped");
    Ok(())
}
