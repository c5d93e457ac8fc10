//! Request logger: the entry point producers talk to.
//!
//! # Responsibilities
//! - Build the queue and spawn the aggregator when aggregation is enabled
//! - Otherwise emit every observation immediately (realtime path)
//! - Hold the per-request settings the middleware needs
//!
//! # Design Decisions
//! - With aggregation disabled no queue or task exists at all
//! - Recording an observation never blocks and never fails

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::aggregate::{
    Aggregator, AggregatorHandle, BotDetector, BotVerdict, Emitter, KeywordBotDetector,
    Observation, ObservationQueue,
};
use crate::config::{RequestConfig, TelemetryConfig};
use crate::http::request::{default_path_aggregator, PathAggregator};
use crate::observability::{LogSink, TracingSink};

/// Routes observations to the aggregator or straight to the sink.
pub struct RequestLogger {
    queue: Option<ObservationQueue>,
    sink: Arc<dyn LogSink>,
    bot_detector: Option<Arc<dyn BotDetector>>,
    path_aggregator: PathAggregator,
    excluded_paths: HashSet<String>,
    request_config: RequestConfig,
}

impl RequestLogger {
    pub fn builder(config: TelemetryConfig) -> RequestLoggerBuilder {
        RequestLoggerBuilder {
            config,
            sink: None,
            bot_detector: None,
            path_aggregator: None,
        }
    }

    /// Record one completed request.
    pub fn record(&self, observation: Observation) {
        match &self.queue {
            Some(queue) => queue.enqueue(observation),
            None => {
                let bot = BotVerdict::classify(self.bot_detector.as_deref(), &observation.user_agent);
                self.sink.emit_request(&observation, bot);
            }
        }
    }

    pub fn is_aggregating(&self) -> bool {
        self.queue.is_some()
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths.contains(path)
    }

    /// Observations dropped on a full queue so far.
    pub fn dropped(&self) -> u64 {
        self.queue.as_ref().map(ObservationQueue::dropped).unwrap_or(0)
    }

    pub fn request_config(&self) -> &RequestConfig {
        &self.request_config
    }

    pub fn path_aggregator(&self) -> &PathAggregator {
        &self.path_aggregator
    }
}

/// Builder for [`RequestLogger`].
pub struct RequestLoggerBuilder {
    config: TelemetryConfig,
    sink: Option<Arc<dyn LogSink>>,
    bot_detector: Option<Arc<dyn BotDetector>>,
    path_aggregator: Option<PathAggregator>,
}

impl RequestLoggerBuilder {
    /// Replace the default tracing sink.
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Use a custom bot detector regardless of `bot_detection.enabled`.
    pub fn bot_detector(mut self, detector: Arc<dyn BotDetector>) -> Self {
        self.bot_detector = Some(detector);
        self
    }

    /// Replace the default route/error-bucket path labelling.
    pub fn path_aggregator<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str, u16) -> String + Send + Sync + 'static,
    {
        let f: PathAggregator = Arc::new(f);
        self.path_aggregator = Some(f);
        self
    }

    /// Build the logger. When aggregation is enabled the aggregator is
    /// spawned onto the current runtime and stops when `cancel` fires.
    pub fn start(self, cancel: CancellationToken) -> (Arc<RequestLogger>, Option<AggregatorHandle>) {
        let TelemetryConfig {
            aggregation,
            request,
            bot_detection,
            ..
        } = self.config;

        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(TracingSink::new(&request)) as Arc<dyn LogSink>);
        let bot_detector = self.bot_detector.or_else(|| {
            bot_detection
                .enabled
                .then(|| Arc::new(KeywordBotDetector::from_config(&bot_detection)) as Arc<dyn BotDetector>)
        });

        let (queue, handle) = if aggregation.enabled {
            let aggregator = Aggregator::new(
                aggregation.interval(),
                Emitter::new(sink.clone()),
                bot_detector.clone(),
            );
            let (queue, handle) = aggregator.spawn(aggregation.queue_size, cancel);
            (Some(queue), Some(handle))
        } else {
            (None, None)
        };

        let logger = RequestLogger {
            queue,
            sink,
            bot_detector,
            path_aggregator: self
                .path_aggregator
                .unwrap_or_else(|| Arc::new(default_path_aggregator) as PathAggregator),
            excluded_paths: request.excluded_paths.iter().cloned().collect(),
            request_config: request,
        };
        (Arc::new(logger), handle)
    }
}
