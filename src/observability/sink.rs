//! Output seam for summary and per-request records.

use std::collections::BTreeMap;

use chrono::SecondsFormat;

use crate::aggregate::bot::BotVerdict;
use crate::aggregate::observation::Observation;
use crate::aggregate::summary::Summary;
use crate::config::RequestConfig;

/// Tracing target of aggregated summary events.
pub const SUMMARY_TARGET: &str = "request_telemetry::summary";

/// Tracing target of per-request events (aggregation disabled).
pub const REQUEST_TARGET: &str = "request_telemetry::request";

/// Receives the records produced by the aggregator and the realtime path.
///
/// Implementations must return quickly: `emit_summaries` runs on the
/// aggregator task and `emit_request` on the request path.
pub trait LogSink: Send + Sync {
    /// One call per non-empty flush, carrying the whole window.
    fn emit_summaries(&self, summaries: &[Summary]);

    /// One call per request when aggregation is disabled.
    fn emit_request(&self, observation: &Observation, bot: BotVerdict);
}

/// Writes records as structured `tracing` events.
///
/// Event field names are fixed at compile time, so the configured header
/// fields and static fields cannot become top-level fields of their own.
/// They are flattened into one `fields` value holding a JSON object
/// (e.g. `{"_appName":"api","country":"IT"}`); log pipelines should parse
/// that value to filter on them. A static field wins over a header field
/// of the same name.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    message: String,
    static_fields: BTreeMap<String, String>,
    log_query_string: bool,
    log_headers: bool,
}

impl TracingSink {
    pub fn new(config: &RequestConfig) -> Self {
        Self {
            message: config.message.clone(),
            static_fields: config.static_fields.clone(),
            log_query_string: config.log_query_string,
            log_headers: config.log_headers,
        }
    }

    /// Header fields found on the request plus the static fields, as one JSON object.
    fn extra_fields(&self, found: &BTreeMap<String, String>) -> Option<String> {
        if found.is_empty() && self.static_fields.is_empty() {
            return None;
        }
        let map: serde_json::Map<String, serde_json::Value> = found
            .iter()
            .chain(self.static_fields.iter())
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        Some(serde_json::Value::Object(map).to_string())
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

impl LogSink for TracingSink {
    fn emit_summaries(&self, summaries: &[Summary]) {
        let fields = self.extra_fields(&BTreeMap::new());
        for s in summaries {
            tracing::info!(
                target: SUMMARY_TARGET,
                created = %s.created.to_rfc3339_opts(SecondsFormat::Secs, true),
                ip = %s.ip,
                remote_ip = %s.remote_ip,
                ua = %s.user_agent,
                method = %s.method,
                proto = %s.proto,
                status_code = s.status_code,
                counter = s.count,
                is_bot = s.bot.flag(),
                aggregate_path = non_empty(&s.aggregate_path),
                mean_latency = ?s.mean_latency,
                min_latency = ?s.min_latency,
                max_latency = ?s.max_latency,
                mean_size_resp_body = s.mean_response_size,
                sum_size_resp_body = s.sum_response_size,
                fields = fields.as_deref(),
                "{}",
                self.message
            );
        }
    }

    fn emit_request(&self, o: &Observation, bot: BotVerdict) {
        let details = &o.details;
        let query_string = if self.log_query_string {
            non_empty(&details.query)
        } else {
            None
        };
        let headers = (self.log_headers && !details.headers.is_empty())
            .then(|| format!("{:?}", details.headers));
        let fields = self.extra_fields(&details.extra_fields);

        tracing::info!(
            target: REQUEST_TARGET,
            created = %o.created.to_rfc3339_opts(SecondsFormat::Secs, true),
            ip = %o.ip,
            remote_ip = %o.remote_ip,
            ua = %o.user_agent,
            method = %o.method,
            proto = %o.proto,
            status_code = o.status_code,
            counter = 1u64,
            referer = non_empty(&details.referer),
            is_bot = bot.flag(),
            aggregate_path = non_empty(&o.aggregate_path),
            path = non_empty(&details.path),
            query_string,
            full_headers = headers,
            latency = ?o.latency,
            response_size = o.response_size,
            fields = fields.as_deref(),
            "{}",
            self.message
        );
    }
}
