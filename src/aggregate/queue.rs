//! Bounded ingestion queue between request handlers and the aggregator.
//!
//! # Design Decisions
//! - Producers never wait: a full queue drops the new observation
//! - Each drop is reported as a warning and a metric, never to the caller
//! - Unbounded buffering is not an option; memory stays capped under overload

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::aggregate::observation::Observation;
use crate::observability::metrics;

/// Producer handle of the ingestion queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ObservationQueue {
    tx: mpsc::Sender<Observation>,
    dropped: Arc<AtomicU64>,
}

/// Create a queue holding at most `capacity` observations.
///
/// A capacity of zero is raised to one.
pub fn bounded(capacity: usize) -> (ObservationQueue, mpsc::Receiver<Observation>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let queue = ObservationQueue {
        tx,
        dropped: Arc::new(AtomicU64::new(0)),
    };
    (queue, rx)
}

impl ObservationQueue {
    /// Hand an observation to the aggregator without blocking.
    pub fn enqueue(&self, observation: Observation) {
        match self.tx.try_send(observation) {
            Ok(()) => metrics::record_enqueued(),
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                metrics::record_dropped();
                tracing::warn!(
                    capacity = self.tx.max_capacity(),
                    "Telemetry queue is full, dropping observation"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Telemetry aggregator stopped, discarding observation");
            }
        }
    }

    /// Number of observations dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}
