use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// Upper bound for both listeners to bind and answer readiness probes
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    /// Pause between failed readiness probe attempts
    #[serde(default = "default_probe_retry_interval_ms")]
    pub probe_retry_interval_ms: u64,

    #[serde(default = "default_probe_read_timeout_ms")]
    pub probe_read_timeout_ms: u64,

    /// TCP connections are closed when a query does not arrive (or complete) in time
    #[serde(default = "default_tcp_idle_timeout_secs")]
    pub tcp_idle_timeout_secs: u64,
}

impl ServerConfig {
    /// `host:port` shared by the TCP and UDP listeners.
    pub fn listen_address(&self) -> String {
        if self.bind_address.contains(':') && !self.bind_address.starts_with('[') {
            format!("[{}]:{}", self.bind_address, self.dns_port)
        } else {
            format!("{}:{}", self.bind_address, self.dns_port)
        }
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    pub fn probe_retry_interval(&self) -> Duration {
        Duration::from_millis(self.probe_retry_interval_ms)
    }

    pub fn probe_read_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_read_timeout_ms)
    }

    pub fn tcp_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.tcp_idle_timeout_secs)
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_dns_port() -> u16 {
    53
}

fn default_startup_timeout_secs() -> u64 {
    5
}

fn default_probe_retry_interval_ms() -> u64 {
    1
}

fn default_probe_read_timeout_ms() -> u64 {
    100
}

fn default_tcp_idle_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            dns_port: default_dns_port(),
            startup_timeout_secs: default_startup_timeout_secs(),
            probe_retry_interval_ms: default_probe_retry_interval_ms(),
            probe_read_timeout_ms: default_probe_read_timeout_ms(),
            tcp_idle_timeout_secs: default_tcp_idle_timeout_secs(),
        }
    }
}
