pub mod dns_server;
pub mod handler_adapter;
pub mod metrics_handler;
pub mod metrics_server;
pub mod readiness;

pub use dns_server::DnsServer;
pub use handler_adapter::HandlerAdapter;
pub use metrics_handler::MetricsDnsHandler;
pub use metrics_server::MetricsServerWrapper;
pub use readiness::{ReadinessProbe, PROBE_QUERY};
