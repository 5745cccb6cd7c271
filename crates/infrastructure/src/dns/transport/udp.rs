use anchor_dns_application::ports::{DnsHandler, Listener, ResponseWriter};
use anchor_dns_domain::{Protocol, ServerError};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::is_transient;

/// Maximum UDP DNS message size with EDNS(0)
const MAX_UDP_MESSAGE_SIZE: usize = 4096;

/// DNS over UDP listener. Every datagram is handled on its own task.
pub struct UdpListener {
    address: String,
    handler: Arc<dyn DnsHandler>,
}

impl UdpListener {
    pub fn new(address: impl Into<String>, handler: Arc<dyn DnsHandler>) -> Self {
        Self {
            address: address.into(),
            handler,
        }
    }
}

#[async_trait]
impl Listener for UdpListener {
    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }

    async fn listen_and_serve(&self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let socket = UdpSocket::bind(self.address.as_str())
            .await
            .map_err(|source| ServerError::TransportBind {
                protocol: Protocol::Udp,
                address: self.address.clone(),
                source,
            })?;
        let socket = Arc::new(socket);
        info!(protocol = "UDP", address = %self.address, "DNS listener bound");

        let mut buf = vec![0u8; MAX_UDP_MESSAGE_SIZE];
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(protocol = "UDP", "DNS listener stopped");
                    return Ok(());
                }
                received = socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, peer)) => {
                            let message = buf[..len].to_vec();
                            let handler = Arc::clone(&self.handler);
                            let socket = Arc::clone(&socket);
                            tokio::spawn(async move {
                                let mut writer = UdpResponseWriter::new(socket, peer);
                                handler.handle(&mut writer, &message).await;
                            });
                        }
                        Err(e) if is_transient(&e) => {
                            debug!(error = %e, "Ignoring UDP receive error");
                        }
                        Err(source) => {
                            return Err(ServerError::Transport {
                                protocol: Protocol::Udp,
                                source,
                            });
                        }
                    }
                }
            }
        }
    }
}

/// Sends the response datagram back to the querying peer.
pub struct UdpResponseWriter {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpResponseWriter {
    pub fn new(socket: Arc<UdpSocket>, peer: SocketAddr) -> Self {
        Self { socket, peer }
    }
}

#[async_trait]
impl ResponseWriter for UdpResponseWriter {
    async fn write(&mut self, message: &[u8]) -> std::io::Result<()> {
        self.socket.send_to(message, self.peer).await?;
        Ok(())
    }

    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}
