//! Scanner module - the concurrent scanning engine.
//!
//! A [`ScanSession`] dispatches one [`ScanRequest`] per port into a bounded
//! worker pool; workers probe with the [`Prober`] and hand each
//! [`ScanResult`] to a single listener that writes the report.

pub mod dispatch;
pub mod listener;
pub mod pool;
pub mod session;
pub mod tcp;
pub mod traits;
pub mod udp;

use crate::config::ScanSettings;
use async_trait::async_trait;

pub use session::{ScanSession, ScanSummary, SessionState};
pub use tcp::TcpProber;
pub use traits::{PortStatus, Prober, Protocol, ScanRequest, ScanResult};
pub use udp::UdpProber;

/// Prober that picks the TCP or UDP probe by the request's protocol.
#[derive(Debug, Clone, Default)]
pub struct NetworkProber {
    tcp: TcpProber,
    udp: UdpProber,
}

impl NetworkProber {
    pub fn new(settings: &ScanSettings) -> Self {
        Self {
            tcp: TcpProber::new(settings.probe_timeout),
            udp: UdpProber::new(settings.probe_timeout, settings.udp_probe_count),
        }
    }
}

#[async_trait]
impl Prober for NetworkProber {
    async fn probe(&self, request: &ScanRequest) -> PortStatus {
        match request.protocol {
            Protocol::Tcp => self.tcp.probe(&request.host, request.port).await,
            Protocol::Udp => self.udp.probe(&request.host, request.port).await,
        }
    }
}
