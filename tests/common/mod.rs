//! Shared utilities for integration tests.

use std::sync::Mutex;
use std::time::Duration;

use request_telemetry::aggregate::{BotVerdict, Observation, Summary};
use request_telemetry::observability::LogSink;

/// Sink that keeps everything it receives.
#[derive(Default)]
pub struct CapturingSink {
    batches: Mutex<Vec<Vec<Summary>>>,
    requests: Mutex<Vec<(Observation, BotVerdict)>>,
}

#[allow(dead_code)]
impl CapturingSink {
    /// One entry per non-empty flush.
    pub fn batches(&self) -> Vec<Vec<Summary>> {
        self.batches.lock().unwrap().clone()
    }

    /// All summaries across flushes.
    pub fn summaries(&self) -> Vec<Summary> {
        self.batches().into_iter().flatten().collect()
    }

    pub fn requests(&self) -> Vec<(Observation, BotVerdict)> {
        self.requests.lock().unwrap().clone()
    }
}

impl LogSink for CapturingSink {
    fn emit_summaries(&self, summaries: &[Summary]) {
        self.batches.lock().unwrap().push(summaries.to_vec());
    }

    fn emit_request(&self, observation: &Observation, bot: BotVerdict) {
        self.requests.lock().unwrap().push((observation.clone(), bot));
    }
}

/// Observation with fixed identity fields and the given measurements.
#[allow(dead_code)]
pub fn observation(status_code: u16, latency_ms: u64, response_size: u64) -> Observation {
    Observation {
        ip: "203.0.113.10".into(),
        remote_ip: "10.0.0.1".into(),
        user_agent: "Mozilla/5.0".into(),
        method: "GET".into(),
        proto: "HTTP/1.1".into(),
        status_code,
        aggregate_path: "/users/{id}".into(),
        latency: Duration::from_millis(latency_ms),
        response_size,
        ..Default::default()
    }
}
