use anchor_dns_domain::Protocol;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::ports::Connector;

/// Malformed one-byte query sent by the datagram probe. Any reply to it,
/// including an error response, proves the handler chain is serving.
pub const PROBE_QUERY: [u8; 1] = [0x00];

const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(1);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Out-of-band checks that both transports actually serve traffic.
///
/// Both waits retry forever; callers bound them with their own timeout.
#[derive(Clone)]
pub struct ReadinessProbe {
    connector: Arc<dyn Connector>,
    address: String,
    retry_interval: Duration,
    read_timeout: Duration,
}

impl ReadinessProbe {
    pub fn new(connector: Arc<dyn Connector>, address: impl Into<String>) -> Self {
        Self {
            connector,
            address: address.into(),
            retry_interval: DEFAULT_RETRY_INTERVAL,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Pause between failed attempts. Zero only yields to the scheduler.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Resolves on the first successful stream connect. Returns the attempt count.
    pub async fn wait_stream_ready(&self) -> u64 {
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            match self.connector.connect(Protocol::Tcp, &self.address).await {
                Ok(conn) => {
                    drop(conn);
                    debug!(address = %self.address, attempts, "TCP listener accepting connections");
                    return attempts;
                }
                Err(e) => {
                    trace!(address = %self.address, error = %e, "TCP readiness probe failed");
                }
            }
            self.pause().await;
        }
    }

    /// Resolves once a datagram probe gets any reply. Returns the attempt count.
    pub async fn wait_datagram_ready(&self) -> u64 {
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            match self.datagram_health_check().await {
                Ok(()) => {
                    debug!(address = %self.address, attempts, "UDP listener answering queries");
                    return attempts;
                }
                Err(e) => {
                    trace!(address = %self.address, error = %e, "UDP readiness probe failed");
                }
            }
            self.pause().await;
        }
    }

    // Dial and write succeed against an unbound UDP port, so only a reply counts.
    async fn datagram_health_check(&self) -> io::Result<()> {
        let mut conn = self.connector.connect(Protocol::Udp, &self.address).await?;
        conn.send(&PROBE_QUERY).await?;

        let mut buf = [0u8; 512];
        match tokio::time::timeout(self.read_timeout, conn.recv(&mut buf)).await {
            Ok(read) => read.map(|_| ()),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "no reply to readiness probe",
            )),
        }
    }

    async fn pause(&self) {
        if self.retry_interval.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.retry_interval).await;
        }
    }
}
