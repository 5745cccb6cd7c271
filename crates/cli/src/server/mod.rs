pub mod dns;
pub mod metrics;

pub use dns::start_dns_server;
pub use metrics::start_metrics_server;
