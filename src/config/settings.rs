//! Engine settings.
//!
//! There is no settings file: values come from defaults, overridden by
//! command-line flags or their environment variables.

use crate::error::ScanError;
use std::time::Duration;

/// Upper bound on concurrent probes.
pub const DEFAULT_MAX_WORKERS: usize = 100;

/// Per-probe dial timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Datagrams sent per UDP probe.
pub const DEFAULT_UDP_PROBE_COUNT: usize = 10;

/// Tunables for a scan session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    /// Cap on the worker pool size.
    pub max_workers: usize,
    /// Timeout applied to each TCP dial and UDP socket setup.
    pub probe_timeout: Duration,
    /// Number of datagrams a UDP probe attempts to send.
    pub udp_probe_count: usize,
    /// Report closed ports as well as open ones (single-port mode).
    pub report_closed: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            udp_probe_count: DEFAULT_UDP_PROBE_COUNT,
            report_closed: false,
        }
    }
}

impl ScanSettings {
    /// Set the worker cap.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the per-probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Also report closed ports.
    pub fn with_closed(mut self) -> Self {
        self.report_closed = true;
        self
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.max_workers == 0 {
            return Err(ScanError::InvalidConfig(
                "max workers must be at least 1".to_string(),
            ));
        }
        if self.probe_timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "probe timeout must be non-zero".to_string(),
            ));
        }
        if self.udp_probe_count == 0 {
            return Err(ScanError::InvalidConfig(
                "udp probe count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
