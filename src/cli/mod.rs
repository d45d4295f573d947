//! Command-line interface definitions for portscan.
//!
//! Uses `clap` derive macros for declarative argument parsing. The version
//! string is not baked into the parser: it comes from the [`BuildInfo`]
//! handed to [`Cli::parse_with`].

mod scan;

pub use crate::output::OutputFormat;
pub use scan::{ScanCommand, ScanMode};

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::fmt;

/// portscan - scan a host for open TCP or UDP ports.
#[derive(Parser, Debug)]
#[command(name = "portscan")]
#[command(about = "command-line port scan tool", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub scan: ScanCommand,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Build the clap command with the version taken from `build`.
    pub fn command_for(build: &BuildInfo) -> clap::Command {
        Self::command().version(build.to_string())
    }

    /// Parse the process arguments, exiting on usage errors.
    pub fn parse_with(build: &BuildInfo) -> Self {
        let matches = Self::command_for(build).get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// Parse an explicit argument list.
    pub fn try_parse_with<I, T>(build: &BuildInfo, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command_for(build).try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Version metadata supplied by the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub revision: Option<&'static str>,
}

impl BuildInfo {
    /// Metadata of the running binary. The revision is read from
    /// `PORTSCAN_REVISION` at compile time, if set.
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            revision: option_env!("PORTSCAN_REVISION"),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.revision {
            Some(revision) => write!(f, "{} ({})", self.version, revision),
            None => write!(f, "{}", self.version),
        }
    }
}
