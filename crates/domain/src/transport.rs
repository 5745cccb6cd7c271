use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport protocol a listener is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Stream transport.
    Tcp,
    /// Datagram transport.
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listener bound to one protocol and address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportBinding {
    pub protocol: Protocol,
    pub address: String,
}

impl TransportBinding {
    pub fn new(protocol: Protocol, address: impl Into<String>) -> Self {
        Self {
            protocol,
            address: address.into(),
        }
    }

    /// The stream and datagram bindings of one server instance.
    pub fn pair(address: &str) -> [TransportBinding; 2] {
        [
            TransportBinding::new(Protocol::Tcp, address),
            TransportBinding::new(Protocol::Udp, address),
        ]
    }
}

impl fmt::Display for TransportBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.address)
    }
}
