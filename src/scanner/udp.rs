//! UDP prober.
//!
//! UDP has no handshake, so openness is inferred from whether datagrams
//! can be sent to the target at all.
//!
//! # Known limitation
//!
//! This is a heuristic. A send succeeding does not mean anything is
//! listening: the kernel accepts the first datagram to almost any
//! reachable address, so most UDP ports report open. A port only reads
//! closed when resolution or socket setup fails, or every send is
//! rejected synchronously (e.g. after an ICMP port unreachable).

use crate::config::{DEFAULT_PROBE_TIMEOUT, DEFAULT_UDP_PROBE_COUNT};
use crate::scanner::traits::PortStatus;
use crate::types::Port;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;
use tracing::trace;

/// Payload of each probe datagram.
const PROBE_PAYLOAD: &[u8] = b"\x00";

/// UDP prober.
#[derive(Debug, Clone)]
pub struct UdpProber {
    timeout: Duration,
    probe_count: usize,
}

impl UdpProber {
    /// Create a new UDP prober.
    ///
    /// # Arguments
    /// * `timeout` - Bound on resolving the host and setting up the socket
    /// * `probe_count` - Datagrams to attempt per port
    pub fn new(timeout: Duration, probe_count: usize) -> Self {
        Self {
            timeout,
            probe_count,
        }
    }

    /// Probe a single port.
    pub async fn probe(&self, host: &str, port: Port) -> PortStatus {
        let socket = match timeout(self.timeout, connect(host, port)).await {
            Ok(Ok(socket)) => socket,
            Ok(Err(e)) => {
                trace!(host, port = port.as_u16(), error = %e, "udp setup failed");
                return PortStatus::Closed;
            }
            Err(_) => {
                trace!(host, port = port.as_u16(), "udp setup timed out");
                return PortStatus::Closed;
            }
        };

        let mut delivered = 0;
        for _ in 0..self.probe_count {
            match socket.send(PROBE_PAYLOAD).await {
                Ok(_) => delivered += 1,
                Err(e) => trace!(port = port.as_u16(), error = %e, "udp send rejected"),
            }
        }

        if delivered > 0 {
            PortStatus::Open
        } else {
            PortStatus::Closed
        }
    }
}

impl Default for UdpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT, DEFAULT_UDP_PROBE_COUNT)
    }
}

/// Resolve `host` and connect an ephemeral socket to it.
async fn connect(host: &str, port: Port) -> io::Result<UdpSocket> {
    let addr = lookup_host((host, port.as_u16()))
        .await?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses for host"))?;

    // Bind to random local port of the matching family
    let local = if addr.is_ipv4() {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    };

    let socket = UdpSocket::bind(local).await?;
    socket.connect(addr).await?;
    Ok(socket)
}
