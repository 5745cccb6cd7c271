use crate::Protocol;
use std::net::SocketAddr;
use std::time::Instant;

/// Per-request metadata handed to the metrics chain.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext {
    pub protocol: Protocol,
    pub peer: SocketAddr,
    pub received_at: Instant,
}

impl QueryContext {
    pub fn new(protocol: Protocol, peer: SocketAddr) -> Self {
        Self {
            protocol,
            peer,
            received_at: Instant::now(),
        }
    }
}

/// Status returned by a plugin-style handler.
///
/// `HANDLED` means the stage already wrote its response; any other value is a
/// DNS response code the caller is expected to answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ServeStatus(u16);

impl ServeStatus {
    pub const HANDLED: ServeStatus = ServeStatus(0);

    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub const fn code(&self) -> u16 {
        self.0
    }

    pub fn is_handled(&self) -> bool {
        *self == Self::HANDLED
    }
}
