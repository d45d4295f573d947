//! Prober trait abstraction and the values that flow through the pool.
//!
//! Requests and results are moved from producer to consumer; nothing
//! mutates them after hand-off.

use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Transport protocol used to probe a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Default for Protocol {
    fn default() -> Self {
        Self::Tcp
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

/// Status of a scanned port.
///
/// A failed probe and a closed port are deliberately the same thing;
/// there is no "filtered" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    Open,
    Closed,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// One unit of work: probe `port` on `host` using `protocol`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub host: Arc<str>,
    pub port: Port,
    pub protocol: Protocol,
}

impl ScanRequest {
    pub fn new(host: Arc<str>, port: Port, protocol: Protocol) -> Self {
        Self {
            host,
            port,
            protocol,
        }
    }

    /// Consume the request, producing its result.
    pub fn into_result(self, status: PortStatus) -> ScanResult {
        ScanResult {
            host: self.host,
            port: self.port,
            protocol: self.protocol,
            status,
        }
    }
}

/// Outcome of probing a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub host: Arc<str>,
    pub port: Port,
    pub protocol: Protocol,
    pub status: PortStatus,
}

impl ScanResult {
    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

/// Liveness check for a single request.
///
/// Implementations must not fail: every error a probe runs into is
/// reported as [`PortStatus::Closed`].
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, request: &ScanRequest) -> PortStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_display() {
        assert_eq!(Protocol::Tcp.to_string(), "tcp");
        assert_eq!(Protocol::Udp.to_string(), "udp");
        assert_eq!(Protocol::default(), Protocol::Tcp);
    }

    #[test]
    fn test_request_into_result() {
        let port = Port::new(8080).unwrap();
        let request = ScanRequest::new(Arc::from("localhost"), port, Protocol::Udp);
        let result = request.into_result(PortStatus::Open);

        assert!(result.is_open());
        assert_eq!(&*result.host, "localhost");
        assert_eq!(result.port, port);
        assert_eq!(result.protocol, Protocol::Udp);
    }

    #[test]
    fn test_result_serialization() {
        let port = Port::new(53).unwrap();
        let result =
            ScanRequest::new(Arc::from("10.0.0.1"), port, Protocol::Udp).into_result(PortStatus::Closed);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"host":"10.0.0.1","port":53,"protocol":"udp","status":"closed"}"#
        );
    }
}
