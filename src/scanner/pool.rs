//! Fixed-size worker pool.
//!
//! Workers share one request receiver behind an async mutex, so each
//! request is handed to exactly one worker. Results go out on a separate
//! channel to the listener.

use crate::scanner::traits::{Prober, ScanRequest, ScanResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinSet;
use tracing::trace;

/// Shared receiving end of the request queue.
pub type RequestQueue = Arc<Mutex<mpsc::Receiver<ScanRequest>>>;

/// Number of workers to spawn for `total_ports` ports.
///
/// Never more than `max_workers`, never more than there are ports, and at
/// least one.
pub fn worker_count(max_workers: usize, total_ports: usize) -> usize {
    max_workers.min(total_ports).max(1)
}

/// Count of dispatched requests whose results have not been handed off yet.
#[derive(Debug, Default)]
pub struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more outstanding request.
    pub fn begin(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    /// Record that one outstanding request is done.
    pub fn complete(&self) {
        if self.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_one();
        }
    }

    pub fn pending(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Wait until no requests are outstanding.
    ///
    /// Only meaningful once dispatch has finished: before that the count can
    /// touch zero between two requests.
    pub async fn wait_idle(&self) {
        while self.pending() > 0 {
            self.idle.notified().await;
        }
    }
}

/// Marks a request complete when dropped, including on unwind.
struct Completion<'a>(&'a InFlight);

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}

/// Worker loop: receive, probe, send, repeat until the queue is closed and
/// drained.
pub async fn run_worker<P>(
    id: usize,
    requests: RequestQueue,
    results: mpsc::Sender<ScanResult>,
    prober: Arc<P>,
    in_flight: Arc<InFlight>,
) where
    P: Prober + ?Sized,
{
    loop {
        // Lock is released before probing so other workers can receive.
        let next = requests.lock().await.recv().await;
        let Some(request) = next else {
            break;
        };

        let _done = Completion(in_flight.as_ref());
        let status = prober.probe(&request).await;
        trace!(worker = id, port = request.port.as_u16(), %status, "probe finished");

        if results.send(request.into_result(status)).await.is_err() {
            // Listener is gone; nothing downstream can use further results.
            break;
        }
    }
    trace!(worker = id, "worker exiting");
}

/// Spawn `count` workers onto a join set.
pub fn spawn_workers<P>(
    count: usize,
    requests: &RequestQueue,
    results: &mpsc::Sender<ScanResult>,
    prober: &Arc<P>,
    in_flight: &Arc<InFlight>,
) -> JoinSet<()>
where
    P: Prober + ?Sized + 'static,
{
    let mut workers = JoinSet::new();
    for id in 0..count {
        workers.spawn(run_worker(
            id,
            Arc::clone(requests),
            results.clone(),
            Arc::clone(prober),
            Arc::clone(in_flight),
        ));
    }
    workers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::traits::{PortStatus, Protocol};
    use crate::types::Port;
    use async_trait::async_trait;

    struct EvenOpen;

    #[async_trait]
    impl Prober for EvenOpen {
        async fn probe(&self, request: &ScanRequest) -> PortStatus {
            if request.port.as_u16() % 2 == 0 {
                PortStatus::Open
            } else {
                PortStatus::Closed
            }
        }
    }

    #[test]
    fn test_worker_count() {
        assert_eq!(worker_count(100, 1), 1);
        assert_eq!(worker_count(100, 3), 3);
        assert_eq!(worker_count(100, 100), 100);
        assert_eq!(worker_count(100, 1023), 100);
        assert_eq!(worker_count(100, 65535), 100);
        assert_eq!(worker_count(0, 10), 1);
    }

    #[test]
    fn test_worker_count_matches_formula_for_all_sizes() {
        for total in 1..=1000 {
            let count = worker_count(100, total);
            assert_eq!(count, total.min(100));
            assert!(count >= 1);
        }
    }

    #[tokio::test]
    async fn test_in_flight_wait_idle() {
        let in_flight = Arc::new(InFlight::new());
        in_flight.begin();
        in_flight.begin();
        assert_eq!(in_flight.pending(), 2);

        let waiter = {
            let in_flight = Arc::clone(&in_flight);
            tokio::spawn(async move { in_flight.wait_idle().await })
        };

        in_flight.complete();
        in_flight.complete();
        waiter.await.unwrap();
        assert_eq!(in_flight.pending(), 0);
    }

    #[tokio::test]
    async fn test_in_flight_idle_returns_immediately() {
        InFlight::new().wait_idle().await;
    }

    #[tokio::test]
    async fn test_workers_drain_queue_and_exit() {
        let (request_tx, request_rx) = mpsc::channel(4);
        let (result_tx, mut result_rx) = mpsc::channel(4);
        let requests: RequestQueue = Arc::new(Mutex::new(request_rx));
        let in_flight = Arc::new(InFlight::new());
        let prober = Arc::new(EvenOpen);

        let mut workers = spawn_workers(3, &requests, &result_tx, &prober, &in_flight);
        drop(result_tx);

        let feeder = tokio::spawn({
            let in_flight = Arc::clone(&in_flight);
            async move {
                let host: Arc<str> = Arc::from("127.0.0.1");
                for port in 1..=10 {
                    in_flight.begin();
                    let request =
                        ScanRequest::new(Arc::clone(&host), Port::new(port).unwrap(), Protocol::Tcp);
                    request_tx.send(request).await.unwrap();
                }
            }
        });

        let mut received = Vec::new();
        while let Some(result) = result_rx.recv().await {
            received.push(result);
        }
        feeder.await.unwrap();
        while let Some(joined) = workers.join_next().await {
            joined.unwrap();
        }

        assert_eq!(in_flight.pending(), 0);
        let mut ports: Vec<u16> = received.iter().map(|r| r.port.as_u16()).collect();
        ports.sort_unstable();
        assert_eq!(ports, (1..=10).collect::<Vec<_>>());
        assert!(received
            .iter()
            .all(|r| r.is_open() == (r.port.as_u16() % 2 == 0)));
    }
}
