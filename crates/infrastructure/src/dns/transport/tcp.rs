use anchor_dns_application::ports::{DnsHandler, Listener, ResponseWriter};
use anchor_dns_domain::{Protocol, ServerError};
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::is_transient;

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10);
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// DNS over TCP listener (RFC 1035 4.2.2 two-byte length framing).
///
/// Each connection runs on its own task and may carry several queries. It is
/// closed when no new query starts within `idle_timeout`, or when a started
/// frame is not completed within `idle_timeout`.
pub struct TcpListener {
    address: String,
    handler: Arc<dyn DnsHandler>,
    idle_timeout: Duration,
}

impl TcpListener {
    pub fn new(address: impl Into<String>, handler: Arc<dyn DnsHandler>) -> Self {
        Self {
            address: address.into(),
            handler,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }
}

#[async_trait]
impl Listener for TcpListener {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    async fn listen_and_serve(&self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let listener = tokio::net::TcpListener::bind(self.address.as_str())
            .await
            .map_err(|source| ServerError::TransportBind {
                protocol: Protocol::Tcp,
                address: self.address.clone(),
                source,
            })?;
        info!(protocol = "TCP", address = %self.address, "DNS listener bound");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(protocol = "TCP", "DNS listener stopped");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let handler = Arc::clone(&self.handler);
                            let shutdown = shutdown.clone();
                            let idle_timeout = self.idle_timeout;
                            tokio::spawn(async move {
                                tokio::select! {
                                    _ = shutdown.cancelled() => {}
                                    result = serve_connection(stream, peer, handler, idle_timeout) => {
                                        if let Err(e) = result {
                                            debug!(peer = %peer, error = %e, "TCP connection closed with error");
                                        }
                                    }
                                }
                            });
                        }
                        Err(e) if is_transient(&e) => {
                            debug!(error = %e, "Ignoring TCP accept error");
                        }
                        Err(e) => {
                            // Typically descriptor exhaustion; keep serving existing connections.
                            warn!(error = %e, "TCP accept failed");
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                        }
                    }
                }
            }
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<dyn DnsHandler>,
    idle_timeout: Duration,
) -> io::Result<()> {
    let (mut reader, mut write_half) = stream.into_split();

    loop {
        let mut len_buf = [0u8; 2];
        match tokio::time::timeout(idle_timeout, reader.read_exact(&mut len_buf)).await {
            Err(_) => {
                debug!(peer = %peer, "TCP connection idle, closing");
                return Ok(());
            }
            Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Ok(Err(e)) => return Err(e),
            Ok(Ok(_)) => {}
        }

        let len = u16::from_be_bytes(len_buf) as usize;
        let mut message = vec![0u8; len];
        match tokio::time::timeout(idle_timeout, reader.read_exact(&mut message)).await {
            Err(_) => {
                debug!(peer = %peer, expected = len, "TCP frame stalled, closing");
                return Ok(());
            }
            Ok(Err(e)) => return Err(e),
            Ok(Ok(_)) => {}
        }

        let mut writer = TcpResponseWriter::new(&mut write_half, peer);
        handler.handle(&mut writer, &message).await;
    }
}

/// Writes one length-prefixed response on the connection the query came from.
pub struct TcpResponseWriter<'a> {
    stream: &'a mut OwnedWriteHalf,
    peer: SocketAddr,
}

impl<'a> TcpResponseWriter<'a> {
    pub fn new(stream: &'a mut OwnedWriteHalf, peer: SocketAddr) -> Self {
        Self { stream, peer }
    }
}

#[async_trait]
impl<'a> ResponseWriter for TcpResponseWriter<'a> {
    async fn write(&mut self, message: &[u8]) -> io::Result<()> {
        let len = u16::try_from(message.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("DNS message too large for TCP framing: {} bytes", message.len()),
            )
        })?;

        let mut framed = Vec::with_capacity(message.len() + 2);
        framed.extend_from_slice(&len.to_be_bytes());
        framed.extend_from_slice(message);
        self.stream.write_all(&framed).await
    }

    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}
