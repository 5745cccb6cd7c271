#![allow(dead_code)]

use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

/// Returns a loopback address whose port is currently free for TCP and UDP.
pub fn free_address() -> String {
    loop {
        let tcp = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = tcp.local_addr().unwrap().port();
        if std::net::UdpSocket::bind(("127.0.0.1", port)).is_ok() {
            return format!("127.0.0.1:{}", port);
        }
    }
}

pub fn build_query(id: u16, domain: &str, record_type: RecordType) -> Vec<u8> {
    let mut query = Query::new();
    query.set_name(Name::from_str(domain).unwrap());
    query.set_query_type(record_type);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);

    let mut buf = Vec::new();
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

/// Sends one UDP query and waits for the reply.
pub async fn udp_exchange(address: &str, query: &[u8]) -> std::io::Result<Vec<u8>> {
    let target: SocketAddr = address.parse().unwrap();
    let socket = UdpSocket::bind("127.0.0.1:0").await?;
    socket.connect(target).await?;
    socket.send(query).await?;

    let mut buf = vec![0u8; 4096];
    let len = tokio::time::timeout(Duration::from_millis(500), socket.recv(&mut buf))
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "no UDP reply"))??;
    buf.truncate(len);
    Ok(buf)
}

/// Sends one length-prefixed query over a fresh TCP connection.
pub async fn tcp_exchange(address: &str, query: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut stream = TcpStream::connect(address).await?;
    let mut framed = (query.len() as u16).to_be_bytes().to_vec();
    framed.extend_from_slice(query);
    stream.write_all(&framed).await?;

    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;
    let mut response = vec![0u8; u16::from_be_bytes(len_buf) as usize];
    stream.read_exact(&mut response).await?;
    Ok(response)
}

/// Connects to a TCP listener that may still be binding.
pub async fn connect_tcp(address: &str, deadline: Duration) -> TcpStream {
    let started = std::time::Instant::now();
    loop {
        if let Ok(stream) = TcpStream::connect(address).await {
            return stream;
        }
        assert!(started.elapsed() < deadline, "nothing accepted on {}", address);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Retries a UDP exchange until the server answers or `deadline` passes.
pub async fn wait_for_udp_reply(address: &str, query: &[u8], deadline: Duration) -> Vec<u8> {
    let started = std::time::Instant::now();
    loop {
        if let Ok(reply) = udp_exchange(address, query).await {
            return reply;
        }
        assert!(started.elapsed() < deadline, "server at {} never answered", address);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// In-memory response sink.
pub struct MemoryWriter {
    pub protocol: anchor_dns_domain::Protocol,
    pub responses: Vec<Vec<u8>>,
}

impl MemoryWriter {
    pub fn new(protocol: anchor_dns_domain::Protocol) -> Self {
        Self {
            protocol,
            responses: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl anchor_dns_application::ports::ResponseWriter for MemoryWriter {
    async fn write(&mut self, message: &[u8]) -> std::io::Result<()> {
        self.responses.push(message.to_vec());
        Ok(())
    }

    fn protocol(&self) -> anchor_dns_domain::Protocol {
        self.protocol
    }

    fn peer_addr(&self) -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }
}
