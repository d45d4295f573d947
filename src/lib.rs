//! # portscan - a concurrent TCP/UDP port scanner
//!
//! portscan probes one host across a range of ports and reports which ones
//! answer. The engine is a bounded worker pool:
//!
//! ```text
//! dispatcher -> request queue -> workers -> results queue -> listener
//! ```
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portscan::config::ScanSettings;
//! use portscan::scanner::{Protocol, ScanSession};
//! use portscan::types::PortRange;
//!
//! #[tokio::main]
//! async fn main() {
//!     let range: PortRange = "1-1023".parse().unwrap();
//!     let mut session =
//!         ScanSession::new("192.168.1.1", range, Protocol::Tcp, ScanSettings::default());
//!
//!     let summary = session.run(std::io::stdout()).await.unwrap();
//!     println!("{} open", summary.open_ports.len());
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated port and port range types
//! - [`scanner`] - Probers, worker pool, dispatcher, listener and session
//! - [`config`] - Engine settings
//! - [`cli`] - Argument parsing and the scan command
//! - [`error`] - Error types
//! - [`output`] - Report line formatting

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use scanner::{PortStatus, Prober, Protocol, ScanRequest, ScanResult, ScanSession};
pub use types::{Port, PortRange};
