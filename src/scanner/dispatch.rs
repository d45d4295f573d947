//! Request dispatcher.
//!
//! Walks the port range in ascending order and feeds one request per port
//! into the request queue, waiting whenever the queue is full.

use crate::error::ScanError;
use crate::scanner::pool::InFlight;
use crate::scanner::traits::{Protocol, ScanRequest};
use crate::types::PortRange;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Enqueue every port in `range`.
///
/// The in-flight counter is raised before each send so a fast worker can
/// never complete a request the counter has not seen yet; a send that fails
/// is taken back out. Returns the number of requests dispatched.
///
/// Fails only if every worker has gone away while ports remain.
pub async fn dispatch(
    host: &Arc<str>,
    range: PortRange,
    protocol: Protocol,
    requests: &mpsc::Sender<ScanRequest>,
    in_flight: &InFlight,
) -> Result<usize, ScanError> {
    let mut dispatched = 0;

    for port in range.iter() {
        in_flight.begin();
        let request = ScanRequest::new(Arc::clone(host), port, protocol);
        if requests.send(request).await.is_err() {
            in_flight.complete();
            return Err(ScanError::QueueClosed(range.len() - dispatched));
        }
        dispatched += 1;
    }

    debug!(dispatched, %range, %protocol, "dispatch complete");
    Ok(dispatched)
}
