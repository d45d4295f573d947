//! Result listener.
//!
//! The only consumer of the results queue and the only writer to the
//! report, so lines never interleave. Lines appear in completion order.

use crate::output::{self, OutputFormat};
use crate::scanner::traits::ScanResult;
use crate::types::Port;
use std::io::{self, Write};
use tokio::sync::mpsc;
use tracing::warn;

/// What the listener saw once the results queue closed.
#[derive(Debug, Default)]
pub struct ListenerReport {
    /// Results received, open or not.
    pub received: usize,
    /// Open ports in the order their results arrived.
    pub open_ports: Vec<Port>,
    /// First error hit while writing the report, if any.
    pub write_error: Option<io::Error>,
}

/// Drains scan results into a writer.
pub struct Listener<W> {
    out: W,
    format: OutputFormat,
    report_closed: bool,
}

impl<W: Write> Listener<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            report_closed: false,
        }
    }

    /// Also write a line for closed ports.
    pub fn with_closed(mut self, report_closed: bool) -> Self {
        self.report_closed = report_closed;
        self
    }

    /// Receive until the queue is closed.
    ///
    /// A failed write does not stop the drain: workers block on a full
    /// queue, so the listener keeps receiving and only remembers the error.
    pub async fn listen(mut self, mut results: mpsc::Receiver<ScanResult>) -> ListenerReport {
        let mut report = ListenerReport::default();

        while let Some(result) = results.recv().await {
            report.received += 1;
            if result.is_open() {
                report.open_ports.push(result.port);
            } else if !self.report_closed {
                continue;
            }

            if report.write_error.is_none() {
                if let Err(e) = output::write_result(&mut self.out, &result, self.format) {
                    warn!(error = %e, "report write failed, discarding further output");
                    report.write_error = Some(e);
                }
            }
        }

        if report.write_error.is_none() {
            if let Err(e) = self.out.flush() {
                report.write_error = Some(e);
            }
        }
        report
    }
}
