pub mod connector;
pub mod handler;
pub mod listener;
pub mod metrics;

pub use connector::{Connector, ProbeConnection};
pub use handler::{DnsHandler, PluginHandler, ResponseWriter};
pub use listener::Listener;
pub use metrics::{MetricsExporter, MetricsReporter};
