//! Output formatting module.
//!
//! Report lines go to the listener's writer (stdout in the binary);
//! diagnostics go to stderr.

use crate::scanner::{PortStatus, ScanResult};
use console::style;
use std::fmt;
use std::io::{self, Write};

/// Output format for report lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    Plain,
    /// One JSON object per line
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Plain
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Render one result as a plain report line, without the newline.
pub fn plain_line(result: &ScanResult) -> String {
    match result.status {
        PortStatus::Open => format!("opening {}/{} port.", result.port, result.protocol),
        PortStatus::Closed => format!("{}/{} port is closed.", result.port, result.protocol),
    }
}

/// Write one result in the requested format, newline terminated.
pub fn write_result<W: Write>(
    out: &mut W,
    result: &ScanResult,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => writeln!(out, "{}", plain_line(result)),
        OutputFormat::Json => {
            let json = serde_json::to_string(result)?;
            writeln!(out, "{}", json)
        }
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}
