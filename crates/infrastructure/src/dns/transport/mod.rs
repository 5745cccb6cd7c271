pub mod connector;
pub mod tcp;
pub mod udp;

pub use connector::NetConnector;
pub use tcp::{TcpListener, TcpResponseWriter};
pub use udp::{UdpListener, UdpResponseWriter};

use std::io;

/// Socket errors that only concern one peer and must not stop a listener.
pub(crate) fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}
