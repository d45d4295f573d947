//! portscan binary entry point.

use anyhow::Result;
use portscan::cli::{BuildInfo, Cli};
use portscan::output;
use std::io;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Log to stderr so the report on stdout stays clean. `RUST_LOG` wins over
/// the `-v` count.
fn init_tracing(default_level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)
}

#[tokio::main]
async fn main() -> ExitCode {
    let build = BuildInfo::current();
    let cli = Cli::parse_with(&build);

    if let Err(e) = init_tracing(cli.log_level()) {
        output::print_warning(&format!("logging disabled: {e:#}"));
    }
    debug!(%build, "portscan starting");

    match cli.scan.execute(io::stdout()).await {
        Ok(summary) => {
            debug!(open = summary.open_ports.len(), "exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            output::print_error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}
