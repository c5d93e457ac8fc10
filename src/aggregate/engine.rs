//! The aggregator task.
//!
//! # Responsibilities
//! - Drain the ingestion queue and merge each observation into the window
//! - Flush the window every interval, whether or not anything arrived
//! - Flush once more on cancellation, then stop
//!
//! # Design Decisions
//! - One task, one `select!` loop: the table is never touched concurrently
//! - Cancellation is polled first, then the timer, then the queue
//! - Observations still queued at cancellation are not merged
//! - Losing every producer does not stop the task; only cancellation does
//! - The current `EngineState` is published on a watch channel so the
//!   handle can observe it after the task owns the aggregator

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::aggregate::accumulator::{Accumulator, AccumulatorTable};
use crate::aggregate::bot::{BotDetector, BotVerdict};
use crate::aggregate::emitter::Emitter;
use crate::aggregate::key::build_key;
use crate::aggregate::observation::Observation;
use crate::aggregate::queue::{self, ObservationQueue};

/// Lifecycle of the aggregator task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    /// Cancellation observed; the terminal flush is in progress.
    Draining,
    Stopped,
}

/// Single-consumer aggregation loop and the window it owns.
pub struct Aggregator {
    table: AccumulatorTable,
    emitter: Emitter,
    bot_detector: Option<Arc<dyn BotDetector>>,
    interval: Duration,
    state: watch::Sender<EngineState>,
}

impl Aggregator {
    /// Create an aggregator flushing every `interval`.
    ///
    /// A zero interval is raised to one millisecond.
    pub fn new(
        interval: Duration,
        emitter: Emitter,
        bot_detector: Option<Arc<dyn BotDetector>>,
    ) -> Self {
        Self {
            table: AccumulatorTable::new(),
            emitter,
            bot_detector,
            interval: interval.max(Duration::from_millis(1)),
            state: watch::Sender::new(EngineState::Running),
        }
    }

    /// Create the ingestion queue and spawn the aggregator onto the runtime.
    pub fn spawn(
        self,
        queue_size: usize,
        cancel: CancellationToken,
    ) -> (ObservationQueue, AggregatorHandle) {
        let (queue, rx) = queue::bounded(queue_size);
        let state = self.state.subscribe();
        let join = tokio::spawn(self.run(rx, cancel));
        (queue, AggregatorHandle { join, state })
    }

    /// Run until `cancel` fires, then flush what is left and return.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Observation>, cancel: CancellationToken) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut queue_open = true;

        tracing::info!(interval = ?self.interval, "Telemetry aggregator started");

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                _ = ticker.tick() => {
                    let emitted = self.flush();
                    tracing::debug!(emitted, "Telemetry window flushed");
                }

                received = rx.recv(), if queue_open => match received {
                    Some(observation) => self.merge(observation),
                    None => {
                        queue_open = false;
                        tracing::debug!("All telemetry producers dropped, waiting for shutdown");
                    }
                },
            }
        }

        self.state.send_replace(EngineState::Draining);
        drop(ticker);
        drop(rx);

        let emitted = self.flush();
        self.state.send_replace(EngineState::Stopped);
        tracing::info!(emitted, "Telemetry aggregator stopped");
    }

    /// Merge one observation into the current window.
    pub fn merge(&mut self, observation: Observation) {
        let detector = self.bot_detector.as_deref();
        self.table
            .entry(build_key(&observation))
            .or_insert_with(|| {
                let bot = BotVerdict::classify(detector, &observation.user_agent);
                Accumulator::new(&observation, bot, Utc::now())
            })
            .merge(&observation);
    }

    /// Emit the current window and start a new one.
    pub fn flush(&mut self) -> usize {
        let window = std::mem::take(&mut self.table);
        self.emitter.flush(&window)
    }

    pub fn state(&self) -> EngineState {
        *self.state.borrow()
    }

    /// Number of series in the current window.
    pub fn series(&self) -> usize {
        self.table.len()
    }
}

/// Join handle of a spawned aggregator.
#[derive(Debug)]
pub struct AggregatorHandle {
    join: JoinHandle<()>,
    state: watch::Receiver<EngineState>,
}

impl AggregatorHandle {
    /// Last state published by the task.
    pub fn state(&self) -> EngineState {
        *self.state.borrow()
    }

    /// Receiver that sees every later state transition.
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.state.clone()
    }

    /// Wait for the aggregator to finish its terminal flush.
    pub async fn stopped(self) {
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "Telemetry aggregator task failed");
        }
    }
}
