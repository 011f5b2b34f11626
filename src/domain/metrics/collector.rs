//! Process-wide metrics history.
//!
//! Thread-safe via an internal `Mutex`. Readers take a snapshot by cloning the
//! history under the lock and compute statistics outside of it.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::statistics::{MetricsComparison, MetricsStatistics};
use crate::ports::AiResult;

/// Append-only history of successful provider calls.
///
/// # Example
///
/// ```ignore
/// let collector = MetricsCollector::new();
///
/// let comparison = collector.compare(&result);
/// collector.record(result.clone());
/// ```
#[derive(Debug, Default)]
pub struct MetricsCollector {
    history: Mutex<Vec<AiResult>>,
}

impl MetricsCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result to the history.
    pub fn record(&self, result: AiResult) {
        self.lock().push(result);
    }

    /// Statistics over the current history, `None` when nothing was recorded.
    pub fn statistics(&self) -> Option<MetricsStatistics> {
        MetricsStatistics::from_history(&self.snapshot())
    }

    /// Compares a result against the history recorded so far.
    ///
    /// The result itself is not part of the baseline; callers record it
    /// separately afterwards. Returns `None` when the history is empty.
    pub fn compare(&self, current: &AiResult) -> Option<MetricsComparison> {
        self.statistics()
            .map(|stats| MetricsComparison::against(current, stats))
    }

    /// Number of recorded results.
    pub fn total_requests(&self) -> usize {
        self.lock().len()
    }

    /// Drops the entire history.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copy of the history at this instant.
    pub fn snapshot(&self) -> Vec<AiResult> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AiResult>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Awaits a provider call and records its result on success.
///
/// Failures pass through untouched and leave the history unchanged.
pub async fn record_call<F, E>(collector: &MetricsCollector, call: F) -> Result<AiResult, E>
where
    F: Future<Output = Result<AiResult, E>>,
{
    let result = call.await?;
    collector.record(result.clone());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{AIError, TokenUsage};
    use std::sync::Arc;

    fn result(duration_ms: u64) -> AiResult {
        AiResult::new("answer", duration_ms, TokenUsage::new(10, 20))
    }

    #[test]
    fn new_collector_is_empty() {
        let collector = MetricsCollector::new();
        assert_eq!(collector.total_requests(), 0);
        assert!(collector.statistics().is_none());
    }

    #[test]
    fn compare_on_empty_history_is_none() {
        let collector = MetricsCollector::new();
        assert!(collector.compare(&result(100)).is_none());
    }

    #[test]
    fn compare_excludes_result_not_yet_recorded() {
        let collector = MetricsCollector::new();
        collector.record(result(100));

        let comparison = collector.compare(&result(150)).unwrap();

        assert_eq!(comparison.statistics.total_requests, 1);
        assert_eq!(comparison.duration.vs_avg, 50.0);
    }

    #[test]
    fn clear_resets_history() {
        let collector = MetricsCollector::new();
        collector.record(result(100));
        collector.record(result(200));

        collector.clear();

        assert_eq!(collector.total_requests(), 0);
    }

    #[test]
    fn concurrent_records_are_all_kept() {
        let collector = Arc::new(MetricsCollector::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let collector = Arc::clone(&collector);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        collector.record(result(t * 100 + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(collector.total_requests(), 400);
    }

    #[tokio::test]
    async fn record_call_records_success() {
        let collector = MetricsCollector::new();

        let outcome = record_call(&collector, async { Ok::<_, AIError>(result(42)) }).await;

        assert_eq!(outcome.unwrap().duration_ms, 42);
        assert_eq!(collector.total_requests(), 1);
    }

    #[tokio::test]
    async fn record_call_skips_failure() {
        let collector = MetricsCollector::new();

        let outcome = record_call(&collector, async {
            Err::<AiResult, _>(AIError::network("reset"))
        })
        .await;

        assert!(outcome.is_err());
        assert_eq!(collector.total_requests(), 0);
    }
}
