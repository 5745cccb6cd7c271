pub mod handlers;
pub mod transport;

pub use handlers::RefusingHandler;
pub use transport::{NetConnector, TcpListener, UdpListener};
