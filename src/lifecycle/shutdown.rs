//! Shutdown coordination.

use tokio_util::sync::CancellationToken;

use crate::aggregate::AggregatorHandle;

/// Coordinator for graceful shutdown.
///
/// Wraps a root cancellation token; each long-running task gets a child
/// token, so cancelling a task never cancels the root.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for one subscriber, cancelled when shutdown is triggered.
    pub fn subscribe(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until shutdown is triggered.
    pub async fn wait(&self) {
        self.token.cancelled().await
    }
}

/// Stop the aggregator once the server has returned, then hand back the
/// server's result. The terminal flush runs whether serving succeeded or not.
pub async fn finish_after_serve<E>(
    served: Result<(), E>,
    aggregator_cancel: &CancellationToken,
    aggregator: Option<AggregatorHandle>,
) -> Result<(), E>
where
    E: std::fmt::Display,
{
    if let Err(e) = &served {
        tracing::error!(error = %e, "HTTP server failed");
    }

    aggregator_cancel.cancel();
    if let Some(handle) = aggregator {
        handle.stopped().await;
    }
    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::aggregate::{Aggregator, BotVerdict, EngineState, Emitter, Observation, Summary};
    use crate::observability::LogSink;

    #[derive(Default)]
    struct CountingSink {
        summaries: Mutex<usize>,
    }

    impl LogSink for CountingSink {
        fn emit_summaries(&self, summaries: &[Summary]) {
            *self.summaries.lock().unwrap() += summaries.len();
        }

        fn emit_request(&self, _observation: &Observation, _bot: BotVerdict) {}
    }

    #[tokio::test]
    async fn test_trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let first = shutdown.subscribe();
        let second = shutdown.subscribe();

        assert!(!first.is_cancelled());
        shutdown.trigger();

        first.cancelled().await;
        second.cancelled().await;
        shutdown.wait().await;
        assert!(shutdown.is_triggered());
    }

    #[test]
    fn test_child_cancel_does_not_propagate_up() {
        let shutdown = Shutdown::new();
        let child = shutdown.subscribe();

        child.cancel();
        assert!(!shutdown.is_triggered());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_serve_still_flushes_window() {
        let sink = Arc::new(CountingSink::default());
        let cancel = CancellationToken::new();
        let aggregator = Aggregator::new(Duration::from_secs(10), Emitter::new(sink.clone()), None);
        let (queue, handle) = aggregator.spawn(8, cancel.clone());
        let state = handle.subscribe();

        queue.enqueue(Observation::default());
        tokio::time::sleep(Duration::from_millis(10)).await;

        let served: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::AddrInUse, "bind failed"));
        let result = finish_after_serve(served, &cancel, Some(handle)).await;

        assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::AddrInUse);
        assert!(cancel.is_cancelled());
        assert_eq!(*state.borrow(), EngineState::Stopped);
        assert_eq!(*sink.summaries.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_finish_without_aggregator() {
        let cancel = CancellationToken::new();
        let result = finish_after_serve::<std::io::Error>(Ok(()), &cancel, None).await;
        assert!(result.is_ok());
        assert!(cancel.is_cancelled());
    }
}
