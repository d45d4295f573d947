//! TCP connect prober.
//!
//! Completes the full TCP handshake using the operating system's socket
//! API. Hostname resolution happens inside the dial, so it counts against
//! the same timeout.

use crate::config::DEFAULT_PROBE_TIMEOUT;
use crate::scanner::traits::PortStatus;
use crate::types::Port;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// TCP connect prober.
///
/// Does not require elevated privileges. Refused, unreachable and
/// timed-out dials all read as closed.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    /// Create a new TCP prober with the given dial timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe a single port.
    pub async fn probe(&self, host: &str, port: Port) -> PortStatus {
        match timeout(self.timeout, TcpStream::connect((host, port.as_u16()))).await {
            Ok(Ok(stream)) => {
                drop(stream);
                PortStatus::Open
            }
            Ok(Err(e)) => {
                trace!(host, port = port.as_u16(), error = %e, "tcp dial failed");
                PortStatus::Closed
            }
            Err(_) => {
                trace!(host, port = port.as_u16(), "tcp dial timed out");
                PortStatus::Closed
            }
        }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}
