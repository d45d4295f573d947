//! Error types for portscan.
//!
//! Uses `thiserror` for ergonomic error definitions. Individual probe
//! failures never show up here: they are folded into a closed port status.

use crate::types::PortError;
use thiserror::Error;

/// Errors that abort a scan session.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("scan session has already run")]
    AlreadyRun,

    #[error("request queue closed with {0} requests still undispatched")]
    QueueClosed(usize),

    #[error("worker task failed: {0}")]
    WorkerFailed(String),

    #[error("result listener failed: {0}")]
    ListenerFailed(String),

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors surfaced by the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Port(#[from] PortError),

    #[error("host must be specified")]
    MissingHost,

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// Input validation failures use 2, matching clap's own usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Port(_) | Self::MissingHost => 2,
            Self::Scan(_) => 1,
        }
    }
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
