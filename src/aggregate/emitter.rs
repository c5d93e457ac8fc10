//! Window flushing.

use std::sync::Arc;

use crate::aggregate::accumulator::AccumulatorTable;
use crate::aggregate::summary::Summary;
use crate::observability::{metrics, LogSink};

/// Renders a window's accumulators as summaries and hands them to the sink.
#[derive(Clone)]
pub struct Emitter {
    sink: Arc<dyn LogSink>,
}

impl Emitter {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Emit one summary per accumulator and return how many were emitted.
    ///
    /// An empty table emits nothing. The table itself is left untouched;
    /// resetting it is the caller's job.
    pub fn flush(&self, table: &AccumulatorTable) -> usize {
        if table.is_empty() {
            return 0;
        }

        let summaries: Vec<Summary> = table.values().map(Summary::from).collect();
        self.sink.emit_summaries(&summaries);
        metrics::record_flush(summaries.len());
        summaries.len()
    }
}
