use serde::{Deserialize, Serialize};

/// Metrics exporter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Expose counters over HTTP (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Listen address of the `/metrics` endpoint
    #[serde(default = "default_metrics_address")]
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            address: default_metrics_address(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_metrics_address() -> String {
    "127.0.0.1:53088".to_string()
}
