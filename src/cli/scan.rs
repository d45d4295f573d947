//! Scan command implementation.
//!
//! Turns validated arguments into a [`ScanSession`] and runs it.

use crate::config::{ScanSettings, DEFAULT_MAX_WORKERS};
use crate::error::{CliError, CliResult};
use crate::output::OutputFormat;
use crate::scanner::{Protocol, ScanSession, ScanSummary};
use crate::types::{Port, PortRange};
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tracing::debug;

/// Scan a host for open ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Host name or IP address to scan
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Single port to scan; a closed result is reported too
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u16).range(1..),
        conflicts_with = "port_range"
    )]
    pub port: Option<u16>,

    /// Port range to scan, e.g. "1-1023" [default: 1-1023]
    #[arg(short = 'r', long, value_name = "RANGE", allow_hyphen_values = true)]
    pub port_range: Option<String>,

    /// Scan UDP ports instead of TCP
    #[arg(short, long)]
    pub udp: bool,

    /// Maximum number of concurrent probes
    #[arg(
        short = 'w',
        long,
        env = "PORTSCAN_MAX_WORKERS",
        default_value_t = DEFAULT_MAX_WORKERS,
        value_parser = parse_positive
    )]
    pub max_workers: usize,

    /// Probe timeout in milliseconds
    #[arg(
        short = 't',
        long,
        env = "PORTSCAN_TIMEOUT_MS",
        default_value = "1000",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Output format for report lines
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

/// What the arguments ask to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// `--port`: one port, reported whether open or closed.
    SinglePort(Port),
    /// `--port-range` or the default range: open ports only.
    Range(PortRange),
}

impl ScanMode {
    pub fn range(&self) -> PortRange {
        match *self {
            Self::SinglePort(port) => PortRange::single(port),
            Self::Range(range) => range,
        }
    }
}

impl ScanCommand {
    pub fn protocol(&self) -> Protocol {
        if self.udp {
            Protocol::Udp
        } else {
            Protocol::Tcp
        }
    }

    /// Validate the target and port options.
    pub fn mode(&self) -> CliResult<ScanMode> {
        if self.host.trim().is_empty() {
            return Err(CliError::MissingHost);
        }

        if let Some(port) = self.port {
            return Ok(ScanMode::SinglePort(Port::try_from(port)?));
        }

        match &self.port_range {
            Some(spec) => Ok(ScanMode::Range(spec.parse()?)),
            None => Ok(ScanMode::Range(PortRange::default())),
        }
    }

    /// Engine settings for `mode`.
    pub fn settings(&self, mode: ScanMode) -> ScanSettings {
        let settings = ScanSettings::default()
            .with_max_workers(self.max_workers)
            .with_timeout(Duration::from_millis(self.timeout));

        match mode {
            ScanMode::SinglePort(_) => settings.with_closed(),
            ScanMode::Range(_) => settings,
        }
    }

    /// Execute the scan, writing the report to `out`.
    ///
    /// Input errors are returned before any probe is sent.
    pub async fn execute<W>(&self, out: W) -> CliResult<ScanSummary>
    where
        W: Write + Send + 'static,
    {
        let mode = self.mode()?;
        let settings = self.settings(mode);
        debug!(?mode, ?settings, "validated scan arguments");

        let mut session =
            ScanSession::new(self.host.as_str(), mode.range(), self.protocol(), settings)
                .with_format(self.output);
        Ok(session.run(out).await?)
    }
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PortError;

    fn command(args: &[&str]) -> ScanCommand {
        let mut argv = vec!["portscan"];
        argv.extend_from_slice(args);
        ScanCommand::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cmd = command(&["127.0.0.1"]);
        assert_eq!(cmd.protocol(), Protocol::Tcp);
        assert_eq!(cmd.max_workers, 100);
        assert_eq!(cmd.timeout, 1000);
        assert_eq!(cmd.mode().unwrap(), ScanMode::Range(PortRange::WELL_KNOWN));
    }

    #[test]
    fn test_single_port_reports_closed() {
        let cmd = command(&["127.0.0.1", "-p", "22"]);
        let mode = cmd.mode().unwrap();
        assert_eq!(mode, ScanMode::SinglePort(Port::new(22).unwrap()));
        assert!(cmd.settings(mode).report_closed);
        assert_eq!(mode.range().len(), 1);
    }

    #[test]
    fn test_range_mode_is_silent_on_closed() {
        let cmd = command(&["127.0.0.1", "-r", "8000-8002", "-u"]);
        let mode = cmd.mode().unwrap();
        assert_eq!(cmd.protocol(), Protocol::Udp);
        assert_eq!(mode.range().len(), 3);
        assert!(!cmd.settings(mode).report_closed);
    }

    #[test]
    fn test_malformed_range() {
        let cmd = command(&["127.0.0.1", "-r", "abc"]);
        assert!(matches!(
            cmd.mode(),
            Err(CliError::Port(PortError::InvalidFormat(_)))
        ));

        let cmd = command(&["127.0.0.1", "-r", "-1023"]);
        assert!(matches!(cmd.mode(), Err(CliError::Port(_))));
    }

    #[test]
    fn test_empty_host() {
        let cmd = command(&[""]);
        assert!(matches!(cmd.mode(), Err(CliError::MissingHost)));
    }

    #[test]
    fn test_rejected_flags() {
        assert!(ScanCommand::try_parse_from(["portscan", "h", "-p", "0"]).is_err());
        assert!(ScanCommand::try_parse_from(["portscan", "h", "-w", "0"]).is_err());
        assert!(ScanCommand::try_parse_from(["portscan", "h", "-p", "22", "-r", "1-2"]).is_err());
        assert!(ScanCommand::try_parse_from(["portscan"]).is_err());
    }
}
