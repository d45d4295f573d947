//! Scan session orchestration.
//!
//! A session sizes the pool, wires both queues, dispatches the whole range
//! and then shuts down in order: request queue, workers, results queue,
//! listener. It runs exactly once.

use crate::config::ScanSettings;
use crate::error::ScanError;
use crate::output::OutputFormat;
use crate::scanner::dispatch::dispatch;
use crate::scanner::listener::Listener;
use crate::scanner::pool::{spawn_workers, worker_count, InFlight, RequestQueue};
use crate::scanner::traits::{Prober, Protocol};
use crate::scanner::NetworkProber;
use crate::types::{Port, PortRange};
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, nothing spawned yet.
    Idle,
    /// Workers and listener running, ports being enqueued.
    Dispatching,
    /// Every request accounted for; queues being closed.
    Draining,
    /// All tasks joined.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Dispatching => write!(f, "dispatching"),
            Self::Draining => write!(f, "draining"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Outcome of a completed session.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub host: String,
    pub protocol: Protocol,
    pub range: PortRange,
    pub workers: usize,
    /// Requests placed on the request queue.
    pub dispatched: usize,
    /// Results the listener received.
    pub completed: usize,
    /// Open ports in completion order.
    pub open_ports: Vec<Port>,
    pub duration: Duration,
}

/// One scan of one host over one port range.
pub struct ScanSession<P: ?Sized = NetworkProber> {
    host: Arc<str>,
    range: PortRange,
    protocol: Protocol,
    settings: ScanSettings,
    format: OutputFormat,
    prober: Arc<P>,
    in_flight: Arc<InFlight>,
    state: SessionState,
}

impl ScanSession<NetworkProber> {
    /// Create a session that probes the network.
    pub fn new(
        host: impl Into<Arc<str>>,
        range: PortRange,
        protocol: Protocol,
        settings: ScanSettings,
    ) -> Self {
        let prober = Arc::new(NetworkProber::new(&settings));
        Self::with_prober(host, range, protocol, settings, prober)
    }
}

impl<P> ScanSession<P>
where
    P: Prober + ?Sized + 'static,
{
    /// Create a session around a custom prober.
    pub fn with_prober(
        host: impl Into<Arc<str>>,
        range: PortRange,
        protocol: Protocol,
        settings: ScanSettings,
        prober: Arc<P>,
    ) -> Self {
        Self {
            host: host.into(),
            range,
            protocol,
            settings,
            format: OutputFormat::default(),
            prober,
            in_flight: Arc::new(InFlight::new()),
            state: SessionState::Idle,
        }
    }

    /// Set the report format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Pool size this session will use.
    pub fn worker_count(&self) -> usize {
        worker_count(self.settings.max_workers, self.range.len())
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "session state change");
        self.state = next;
    }

    /// Run the scan, writing report lines to `out`.
    ///
    /// Returns only after every worker and the listener have exited.
    pub async fn run<W>(&mut self, out: W) -> Result<ScanSummary, ScanError>
    where
        W: Write + Send + 'static,
    {
        if self.state != SessionState::Idle {
            return Err(ScanError::AlreadyRun);
        }
        self.settings.validate()?;

        let started = Instant::now();
        let workers = self.worker_count();
        info!(
            host = %self.host,
            range = %self.range,
            protocol = %self.protocol,
            workers,
            "starting scan"
        );

        let (request_tx, request_rx) = mpsc::channel(workers);
        let (result_tx, result_rx) = mpsc::channel(workers);

        let listener = tokio::spawn(
            Listener::new(out, self.format)
                .with_closed(self.settings.report_closed)
                .listen(result_rx),
        );

        // Workers own the only handles to the receiver, so if they all die
        // the dispatcher's sends fail instead of blocking forever.
        let requests: RequestQueue = Arc::new(Mutex::new(request_rx));
        let mut pool = spawn_workers(
            workers,
            &requests,
            &result_tx,
            &self.prober,
            &self.in_flight,
        );
        drop(requests);

        self.transition(SessionState::Dispatching);
        let dispatched = dispatch(
            &self.host,
            self.range,
            self.protocol,
            &request_tx,
            &self.in_flight,
        )
        .await;

        // Requests still buffered when the last worker exits are dropped with
        // the receiver and never completed, so an empty pool also ends the wait.
        let mut worker_error = None;
        if dispatched.is_ok() {
            tokio::select! {
                _ = self.in_flight.wait_idle() => {}
                _ = join_workers(&mut pool, &mut worker_error) => {
                    warn!(pending = self.in_flight.pending(), "every worker exited early");
                }
            }
        }

        self.transition(SessionState::Draining);
        drop(request_tx);
        join_workers(&mut pool, &mut worker_error).await;

        drop(result_tx);
        let report = listener.await;
        self.transition(SessionState::Closed);

        if let Some(e) = worker_error {
            return Err(e);
        }
        let report = report.map_err(|e| ScanError::ListenerFailed(e.to_string()))?;
        let dispatched = dispatched?;
        if let Some(e) = report.write_error {
            return Err(ScanError::Report(e));
        }

        let summary = ScanSummary {
            host: self.host.to_string(),
            protocol: self.protocol,
            range: self.range,
            workers,
            dispatched,
            completed: report.received,
            open_ports: report.open_ports,
            duration: started.elapsed(),
        };
        info!(
            host = %summary.host,
            scanned = summary.completed,
            open = summary.open_ports.len(),
            elapsed_ms = whole_millis(summary.duration),
            "scan complete"
        );
        Ok(summary)
    }
}

/// Join every worker left in `pool`, keeping the first failure.
async fn join_workers(pool: &mut JoinSet<()>, first_error: &mut Option<ScanError>) {
    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            if first_error.is_none() {
                *first_error = Some(ScanError::WorkerFailed(e.to_string()));
            }
        }
    }
}

/// Milliseconds in `duration`, saturating at `u64::MAX`.
fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
