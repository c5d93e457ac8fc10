//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → HTTP server stops accepting and drains
//!             → aggregator token cancelled → terminal flush → exit
//! ```
//!
//! # Design Decisions
//! - The aggregator is cancelled only after the server has drained, so
//!   requests finishing during the drain still reach the final window

pub mod shutdown;
pub mod signals;

pub use shutdown::{finish_after_serve, Shutdown};
