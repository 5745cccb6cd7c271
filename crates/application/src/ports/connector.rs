use anchor_dns_domain::Protocol;
use async_trait::async_trait;

/// Client side connection used by readiness probes. Dropping it closes it.
#[async_trait]
pub trait ProbeConnection: Send {
    async fn send(&mut self, buf: &[u8]) -> std::io::Result<usize>;

    async fn recv(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
}

/// Dials a transport binding.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        protocol: Protocol,
        address: &str,
    ) -> std::io::Result<Box<dyn ProbeConnection>>;
}
