use anchor_dns_application::ports::{Connector, ProbeConnection};
use anchor_dns_domain::Protocol;
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// How the datagram side of the connector behaves.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum UdpBehavior {
    /// Every read gets a one-byte reply.
    Reply,
    /// Dial and write succeed, reads fail with "connection refused".
    RefusedRead,
    /// Dial and write succeed, reads never complete.
    SilentRead,
    /// Dialing fails.
    DialFails,
}

#[derive(Default)]
pub struct Counters {
    pub tcp_attempts: AtomicU64,
    pub udp_attempts: AtomicU64,
    pub udp_writes: AtomicU64,
    pub udp_replies: AtomicU64,
    pub last_payload: std::sync::Mutex<Vec<u8>>,
    pub first_udp_reply_at: std::sync::Mutex<Option<Instant>>,
}

/// Connector double with per-protocol scripted outcomes.
pub struct MockConnector {
    tcp_failures_before_success: Option<u64>,
    udp: UdpBehavior,
    udp_failures_before_reply: u64,
    pub counters: Arc<Counters>,
}

impl MockConnector {
    /// Both probes succeed on their first attempt.
    pub fn always_ready() -> Arc<Self> {
        Arc::new(Self {
            tcp_failures_before_success: Some(0),
            udp: UdpBehavior::Reply,
            udp_failures_before_reply: 0,
            counters: Arc::new(Counters::default()),
        })
    }

    pub fn new(tcp_failures_before_success: Option<u64>, udp: UdpBehavior) -> Arc<Self> {
        Arc::new(Self {
            tcp_failures_before_success,
            udp,
            udp_failures_before_reply: 0,
            counters: Arc::new(Counters::default()),
        })
    }

    /// TCP ready at once, UDP replies only after `failures` refused reads.
    pub fn udp_ready_after(failures: u64) -> Arc<Self> {
        Arc::new(Self {
            tcp_failures_before_success: Some(0),
            udp: UdpBehavior::Reply,
            udp_failures_before_reply: failures,
            counters: Arc::new(Counters::default()),
        })
    }

    pub fn tcp_attempts(&self) -> u64 {
        self.counters.tcp_attempts.load(Ordering::SeqCst)
    }

    pub fn udp_attempts(&self) -> u64 {
        self.counters.udp_attempts.load(Ordering::SeqCst)
    }

    pub fn udp_writes(&self) -> u64 {
        self.counters.udp_writes.load(Ordering::SeqCst)
    }

    pub fn udp_replies(&self) -> u64 {
        self.counters.udp_replies.load(Ordering::SeqCst)
    }

    /// When the datagram probe first got its reply, i.e. when UDP turned ready.
    pub fn first_udp_reply_at(&self) -> Option<Instant> {
        *self.counters.first_udp_reply_at.lock().unwrap()
    }

    pub fn last_payload(&self) -> Vec<u8> {
        self.counters.last_payload.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        protocol: Protocol,
        _address: &str,
    ) -> io::Result<Box<dyn ProbeConnection>> {
        match protocol {
            Protocol::Tcp => {
                let attempt = self.counters.tcp_attempts.fetch_add(1, Ordering::SeqCst);
                match self.tcp_failures_before_success {
                    Some(failures) if attempt >= failures => Ok(Box::new(NullConnection)),
                    _ => Err(io::Error::new(
                        io::ErrorKind::ConnectionRefused,
                        "connection refused",
                    )),
                }
            }
            Protocol::Udp => {
                let attempt = self.counters.udp_attempts.fetch_add(1, Ordering::SeqCst);
                if self.udp == UdpBehavior::DialFails {
                    return Err(io::Error::new(io::ErrorKind::Other, "dial failed"));
                }
                let behavior = match self.udp {
                    UdpBehavior::Reply if attempt < self.udp_failures_before_reply => {
                        UdpBehavior::RefusedRead
                    }
                    other => other,
                };
                Ok(Box::new(UdpConnection {
                    behavior,
                    counters: Arc::clone(&self.counters),
                }))
            }
        }
    }
}

struct NullConnection;

#[async_trait]
impl ProbeConnection for NullConnection {
    async fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    async fn recv(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

struct UdpConnection {
    behavior: UdpBehavior,
    counters: Arc<Counters>,
}

#[async_trait]
impl ProbeConnection for UdpConnection {
    async fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.counters.udp_writes.fetch_add(1, Ordering::SeqCst);
        *self.counters.last_payload.lock().unwrap() = buf.to_vec();
        Ok(buf.len())
    }

    async fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.behavior {
            UdpBehavior::Reply => {
                self.counters.udp_replies.fetch_add(1, Ordering::SeqCst);
                self.counters
                    .first_udp_reply_at
                    .lock()
                    .unwrap()
                    .get_or_insert_with(Instant::now);
                buf[0] = 0x80;
                Ok(1)
            }
            UdpBehavior::SilentRead => std::future::pending().await,
            _ => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
        }
    }
}
