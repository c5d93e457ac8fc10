//! Running statistics for one grouping key within a window.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::aggregate::bot::BotVerdict;
use crate::aggregate::key::GroupingKey;
use crate::aggregate::observation::Observation;

/// Window state: one accumulator per active grouping key.
///
/// Owned by the aggregator task only; replaced wholesale after every flush.
pub type AccumulatorTable = HashMap<GroupingKey, Accumulator>;

/// Running statistics for a single series.
///
/// The identity fields are a snapshot of the first observation of the
/// window and are never overwritten by later merges.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    pub created: DateTime<Utc>,
    pub ip: String,
    pub remote_ip: String,
    pub user_agent: String,
    pub method: String,
    pub proto: String,
    pub status_code: u16,
    pub aggregate_path: String,
    pub bot: BotVerdict,

    count: u64,
    sum_latency: Duration,
    min_latency: Duration,
    max_latency: Duration,
    sum_response_size: u64,
}

impl Accumulator {
    /// Seed an accumulator from the first observation of a series.
    ///
    /// The result holds no merged data yet (`count == 0`); the caller merges
    /// the seeding observation right after.
    pub fn new(first: &Observation, bot: BotVerdict, created: DateTime<Utc>) -> Self {
        Self {
            created,
            ip: first.ip.clone(),
            remote_ip: first.remote_ip.clone(),
            user_agent: first.user_agent.clone(),
            method: first.method.clone(),
            proto: first.proto.clone(),
            status_code: first.status_code,
            aggregate_path: first.aggregate_path.clone(),
            bot,
            count: 0,
            sum_latency: Duration::ZERO,
            min_latency: first.latency,
            max_latency: first.latency,
            sum_response_size: 0,
        }
    }

    /// Fold one observation into the running statistics.
    pub fn merge(&mut self, observation: &Observation) {
        self.count += 1;
        self.sum_latency = self.sum_latency.saturating_add(observation.latency);
        self.min_latency = self.min_latency.min(observation.latency);
        self.max_latency = self.max_latency.max(observation.latency);
        self.sum_response_size = self.sum_response_size.saturating_add(observation.response_size);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum_latency(&self) -> Duration {
        self.sum_latency
    }

    pub fn min_latency(&self) -> Duration {
        self.min_latency
    }

    pub fn max_latency(&self) -> Duration {
        self.max_latency
    }

    pub fn sum_response_size(&self) -> u64 {
        self.sum_response_size
    }
}
