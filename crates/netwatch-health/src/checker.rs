//! Reachability probe.
//!
//! A probe answers one question: can we open a TCP connection to a
//! well-known external endpoint right now? Timeouts, refusals, and
//! routing errors all collapse to `false`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use netwatch_core::config::ProbeConfig;
use tokio::net::TcpStream;
use tracing::debug;

/// Boxed future alias for probe results.
pub type ProbeFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

/// A bounded-latency reachability check — injected for testability.
pub trait Probe: Send + Sync {
    /// Returns `true` if the endpoint answered within the timeout.
    fn probe(&self) -> ProbeFuture<'_>;
}

/// Probes by opening (and immediately dropping) a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(config.address(), config.timeout())
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Probe for TcpProbe {
    fn probe(&self) -> ProbeFuture<'_> {
        Box::pin(tcp_probe(&self.address, self.timeout))
    }
}

/// Attempt a TCP connection to `address` within `timeout`.
pub async fn tcp_probe(address: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            debug!(error = %e, %address, "probe connection failed");
            false
        }
        Err(_) => {
            debug!(%address, timeout_ms = timeout.as_millis() as u64, "probe timed out");
            false
        }
    }
}
