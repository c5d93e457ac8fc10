//! Request aggregation engine.
//!
//! # Data Flow
//! ```text
//! middleware / caller
//!     → queue.rs (non-blocking bounded enqueue, drop-and-warn when full)
//!     → engine.rs (single consumer task)
//!         → key.rs (grouping key per observation)
//!         → accumulator.rs (merge into the window's table)
//!     → [interval tick | cancellation]
//!     → emitter.rs (one Summary per accumulator)
//!     → LogSink (structured log output)
//! ```
//!
//! # Design Decisions
//! - The accumulator table is owned by the engine task alone; producers
//!   only ever touch the queue, so the table needs no lock
//! - A full queue drops the observation instead of blocking the request path
//! - Every flush swaps in a fresh table, so nothing from a previous window
//!   (identity snapshots, bot verdicts) carries over
//! - Records still queued when cancellation is observed are discarded

pub mod accumulator;
pub mod bot;
pub mod emitter;
pub mod engine;
pub mod key;
pub mod observation;
pub mod queue;
pub mod summary;

pub use accumulator::{Accumulator, AccumulatorTable};
pub use bot::{BotDetector, BotVerdict, KeywordBotDetector};
pub use emitter::Emitter;
pub use engine::{Aggregator, AggregatorHandle, EngineState};
pub use key::{build_key, GroupingKey};
pub use observation::{Observation, RequestDetails};
pub use queue::ObservationQueue;
pub use summary::Summary;
