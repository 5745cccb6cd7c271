use anchor_dns_application::ports::Listener;
use anchor_dns_domain::{Protocol, ServerError};
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy)]
enum Behavior {
    Serve,
    FailImmediately,
    FailAfter(Duration),
    PanicAfter(Duration),
}

/// Listener double that either serves until cancelled or fails on demand.
pub struct MockListener {
    protocol: Protocol,
    behavior: Behavior,
    started: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

impl MockListener {
    pub fn serving(protocol: Protocol) -> Arc<Self> {
        Arc::new(Self::with(protocol, Behavior::Serve))
    }

    /// Fails straight away with "address in use".
    pub fn address_in_use(protocol: Protocol) -> Arc<Self> {
        Arc::new(Self::with(protocol, Behavior::FailImmediately))
    }

    pub fn failing_after(protocol: Protocol, delay: Duration) -> Arc<Self> {
        Arc::new(Self::with(protocol, Behavior::FailAfter(delay)))
    }

    /// Crashes the listener task after `delay` instead of returning an error.
    pub fn panicking_after(protocol: Protocol, delay: Duration) -> Arc<Self> {
        Arc::new(Self::with(protocol, Behavior::PanicAfter(delay)))
    }

    fn with(protocol: Protocol, behavior: Behavior) -> Self {
        Self {
            protocol,
            behavior,
            started: Arc::new(AtomicBool::new(false)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn was_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// True once the listener observed its shutdown token.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn bind_error(&self) -> ServerError {
        ServerError::TransportBind {
            protocol: self.protocol,
            address: "127.0.0.1:5353".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        }
    }
}

#[async_trait]
impl Listener for MockListener {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    async fn listen_and_serve(&self, shutdown: CancellationToken) -> Result<(), ServerError> {
        self.started.store(true, Ordering::SeqCst);
        match self.behavior {
            Behavior::FailImmediately => Err(self.bind_error()),
            Behavior::Serve => {
                shutdown.cancelled().await;
                self.cancelled.store(true, Ordering::SeqCst);
                Ok(())
            }
            Behavior::FailAfter(delay) => {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        self.cancelled.store(true, Ordering::SeqCst);
                        Ok(())
                    }
                    _ = tokio::time::sleep(delay) => Err(ServerError::Transport {
                        protocol: self.protocol,
                        source: io::Error::new(io::ErrorKind::ConnectionAborted, "socket closed"),
                    }),
                }
            }
            Behavior::PanicAfter(delay) => {
                tokio::time::sleep(delay).await;
                panic!("{} listener crashed", self.protocol);
            }
        }
    }
}
