//! Summary records emitted at flush time.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::aggregate::accumulator::Accumulator;
use crate::aggregate::bot::BotVerdict;

/// One aggregated log record: everything a window learned about a series.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub created: DateTime<Utc>,
    pub ip: String,
    pub remote_ip: String,
    pub user_agent: String,
    pub method: String,
    pub proto: String,
    pub status_code: u16,
    pub aggregate_path: String,
    pub bot: BotVerdict,
    pub count: u64,
    pub min_latency: Duration,
    pub mean_latency: Duration,
    pub max_latency: Duration,
    pub sum_response_size: u64,
    pub mean_response_size: f64,
}

impl From<&Accumulator> for Summary {
    fn from(acc: &Accumulator) -> Self {
        let count = acc.count();
        let mean_latency = acc
            .sum_latency()
            .as_nanos()
            .checked_div(u128::from(count))
            .map(|n| Duration::from_nanos(u64::try_from(n).unwrap_or(u64::MAX)))
            .unwrap_or_default();
        let mean_response_size = if acc.sum_response_size() > 0 && count > 0 {
            acc.sum_response_size() as f64 / count as f64
        } else {
            0.0
        };

        Self {
            created: acc.created,
            ip: acc.ip.clone(),
            remote_ip: acc.remote_ip.clone(),
            user_agent: acc.user_agent.clone(),
            method: acc.method.clone(),
            proto: acc.proto.clone(),
            status_code: acc.status_code,
            aggregate_path: acc.aggregate_path.clone(),
            bot: acc.bot,
            count,
            min_latency: acc.min_latency(),
            mean_latency,
            max_latency: acc.max_latency(),
            sum_response_size: acc.sum_response_size(),
            mean_response_size,
        }
    }
}
