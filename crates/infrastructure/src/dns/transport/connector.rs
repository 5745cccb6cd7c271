use anchor_dns_application::ports::{Connector, ProbeConnection};
use anchor_dns_domain::Protocol;
use async_trait::async_trait;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Dials real sockets for the readiness probes.
///
/// Wildcard bind addresses (`0.0.0.0`, `::`) are dialed on loopback.
pub struct NetConnector {
    connect_timeout: Duration,
}

impl NetConnector {
    pub fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    async fn resolve(address: &str) -> io::Result<SocketAddr> {
        let mut target = tokio::net::lookup_host(address).await?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address resolved for {}", address),
            )
        })?;

        if target.ip().is_unspecified() {
            target.set_ip(if target.is_ipv4() {
                Ipv4Addr::LOCALHOST.into()
            } else {
                Ipv6Addr::LOCALHOST.into()
            });
        }
        Ok(target)
    }
}

impl Default for NetConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for NetConnector {
    async fn connect(
        &self,
        protocol: Protocol,
        address: &str,
    ) -> io::Result<Box<dyn ProbeConnection>> {
        let target = Self::resolve(address).await?;

        match protocol {
            Protocol::Tcp => {
                let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(target))
                    .await
                    .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "TCP connect timed out"))??;
                Ok(Box::new(TcpProbeConnection(stream)))
            }
            Protocol::Udp => {
                let local: SocketAddr = if target.is_ipv4() {
                    (Ipv4Addr::UNSPECIFIED, 0).into()
                } else {
                    (Ipv6Addr::UNSPECIFIED, 0).into()
                };
                let socket = UdpSocket::bind(local).await?;
                socket.connect(target).await?;
                Ok(Box::new(UdpProbeConnection(socket)))
            }
        }
    }
}

struct TcpProbeConnection(TcpStream);

#[async_trait]
impl ProbeConnection for TcpProbeConnection {
    async fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf).await
    }

    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf).await
    }
}

struct UdpProbeConnection(UdpSocket);

#[async_trait]
impl ProbeConnection for UdpProbeConnection {
    async fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.send(buf).await
    }

    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.recv(buf).await
    }
}
