//! Prometheus metrics exporter sub-service.
//!
//! `DnsMetrics` owns the registry, `PrometheusExporter` drives the HTTP
//! endpoint lifecycle and instruments each query handed to it.
pub mod exporter;
pub mod http;
pub mod recording_writer;
pub mod registry;

pub use exporter::PrometheusExporter;
pub use recording_writer::RecordingWriter;
pub use registry::{rcode_label, DnsMetrics};
