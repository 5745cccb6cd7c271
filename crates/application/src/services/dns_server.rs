use anchor_dns_domain::{ServerError, TransportBinding};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::readiness::ReadinessProbe;
use crate::ports::{Connector, Listener};

const LISTENER_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Starts the TCP and UDP listeners and decides the startup outcome.
///
/// `listen_and_serve` produces exactly one outcome: the first listener error,
/// a startup timeout, or (once both transports answer probes) the serving
/// state, which lasts until `shutdown` fires or a listener dies.
pub struct DnsServer {
    tcp_listener: Arc<dyn Listener>,
    udp_listener: Arc<dyn Listener>,
    timeout: Duration,
    bind_address: String,
    probe: ReadinessProbe,
}

impl DnsServer {
    pub fn new(
        tcp_listener: Arc<dyn Listener>,
        udp_listener: Arc<dyn Listener>,
        connector: Arc<dyn Connector>,
        timeout: Duration,
        bind_address: impl Into<String>,
    ) -> Self {
        let bind_address = bind_address.into();
        Self {
            tcp_listener,
            udp_listener,
            timeout,
            probe: ReadinessProbe::new(connector, bind_address.clone()),
            bind_address,
        }
    }

    pub fn with_probe_retry_interval(mut self, interval: Duration) -> Self {
        self.probe = self.probe.with_retry_interval(interval);
        self
    }

    pub fn with_probe_read_timeout(mut self, timeout: Duration) -> Self {
        self.probe = self.probe.with_read_timeout(timeout);
        self
    }

    /// The stream and datagram bindings this server will start.
    pub fn bindings(&self) -> [TransportBinding; 2] {
        TransportBinding::pair(&self.bind_address)
    }

    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }

    pub fn startup_timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn listen_and_serve(&self, shutdown: CancellationToken) -> Result<(), ServerError> {
        info!(
            bind_address = %self.bind_address,
            timeout_ms = self.timeout.as_millis() as u64,
            "Starting DNS listeners"
        );

        let listener_token = shutdown.child_token();
        let (err_tx, mut err_rx) = mpsc::channel::<ServerError>(2);
        let mut listeners = JoinSet::new();

        let listeners_by_binding = self
            .bindings()
            .into_iter()
            .zip([&self.tcp_listener, &self.udp_listener]);
        for (binding, listener) in listeners_by_binding {
            debug!(%binding, "Spawning DNS listener");
            let listener = Arc::clone(listener);
            let token = listener_token.clone();
            let err_tx = err_tx.clone();
            listeners.spawn(async move {
                let protocol = listener.protocol();
                let outcome = AssertUnwindSafe(listener.listen_and_serve(token))
                    .catch_unwind()
                    .await;
                match outcome {
                    Ok(Ok(())) => debug!(%protocol, "Listener stopped"),
                    Ok(Err(e)) => {
                        let _ = err_tx.send(e).await;
                    }
                    Err(panic) => {
                        let _ = err_tx
                            .send(ServerError::ListenerPanicked {
                                protocol,
                                message: panic_message(&*panic),
                            })
                            .await;
                    }
                }
            });
        }
        drop(err_tx);

        let result = match self.await_startup(&mut err_rx, &shutdown).await {
            Ok(true) => self.serve_until_stopped(&mut err_rx, &shutdown).await,
            Ok(false) => Ok(()),
            Err(e) => Err(e),
        };

        listener_token.cancel();
        if tokio::time::timeout(LISTENER_DRAIN_TIMEOUT, drain(&mut listeners))
            .await
            .is_err()
        {
            warn!("DNS listeners did not stop in time, aborting");
            listeners.abort_all();
        }

        result
    }

    /// `Ok(true)` once both transports are ready, `Ok(false)` if shutdown was
    /// requested before that.
    async fn await_startup(
        &self,
        errors: &mut mpsc::Receiver<ServerError>,
        shutdown: &CancellationToken,
    ) -> Result<bool, ServerError> {
        let readiness = async {
            tokio::join!(
                self.probe.wait_stream_ready(),
                self.probe.wait_datagram_ready()
            )
        };

        tokio::select! {
            biased;

            Some(e) = errors.recv() => {
                error!(error = %e, "DNS listener failed during startup");
                Err(e)
            }
            _ = tokio::time::sleep(self.timeout) => {
                error!(timeout_ms = self.timeout.as_millis() as u64, "DNS listeners not ready in time");
                Err(ServerError::StartupTimeout { timeout: self.timeout })
            }
            _ = shutdown.cancelled() => {
                info!("Shutdown requested during startup");
                Ok(false)
            }
            (tcp_attempts, udp_attempts) = readiness => {
                info!(
                    bind_address = %self.bind_address,
                    tcp_attempts,
                    udp_attempts,
                    "DNS server ready to accept queries"
                );
                Ok(true)
            }
        }
    }

    async fn serve_until_stopped(
        &self,
        errors: &mut mpsc::Receiver<ServerError>,
        shutdown: &CancellationToken,
    ) -> Result<(), ServerError> {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("Shutdown requested, stopping DNS listeners");
                Ok(())
            }
            Some(e) = errors.recv() => {
                error!(error = %e, "DNS listener failed while serving");
                Err(e)
            }
        }
    }
}

async fn drain(listeners: &mut JoinSet<()>) {
    while let Some(joined) = listeners.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                warn!(error = %e, "DNS listener task panicked");
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
