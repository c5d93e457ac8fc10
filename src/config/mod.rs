//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → TelemetryConfig (immutable)
//!     → handed to the request logger, sink and server at startup
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal (or missing) config files
//! - Values are not validated; the few that would break runtime primitives
//!   (zero queue size, zero interval) are raised to the smallest usable value
//!   where they are consumed

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AggregationConfig, BotDetectionConfig, LogFormat, ObservabilityConfig, RequestConfig,
    ServerConfig, TelemetryConfig,
};
