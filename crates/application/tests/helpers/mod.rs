#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_connector;
pub mod mock_listener;

pub use mock_connector::{MockConnector, UdpBehavior};
pub use mock_handlers::{MockExporter, RecordingWriter, TaggingHandler};
pub use mock_listener::MockListener;
