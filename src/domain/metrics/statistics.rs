//! Metrics statistics - averages, lower medians and percentage comparisons.

use serde::{Deserialize, Serialize};

use crate::ports::AiResult;

/// Aggregate statistics over the recorded call history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsStatistics {
    pub total_requests: usize,
    pub avg_duration_ms: f64,
    pub median_duration_ms: u64,
    pub avg_prompt_tokens: f64,
    pub median_prompt_tokens: u64,
    pub avg_completion_tokens: f64,
    pub median_completion_tokens: u64,
    pub avg_total_tokens: f64,
    pub median_total_tokens: u64,
}

impl MetricsStatistics {
    /// Computes statistics over a history snapshot.
    ///
    /// Returns `None` for an empty history.
    pub fn from_history(history: &[AiResult]) -> Option<Self> {
        if history.is_empty() {
            return None;
        }

        let durations: Vec<u64> = history.iter().map(|r| r.duration_ms).collect();
        let prompt: Vec<u64> = history.iter().map(|r| r.prompt_tokens).collect();
        let completion: Vec<u64> = history.iter().map(|r| r.completion_tokens).collect();
        let total: Vec<u64> = history.iter().map(|r| r.total_tokens).collect();

        Some(Self {
            total_requests: history.len(),
            avg_duration_ms: average(&durations)?,
            median_duration_ms: lower_median(&durations)?,
            avg_prompt_tokens: average(&prompt)?,
            median_prompt_tokens: lower_median(&prompt)?,
            avg_completion_tokens: average(&completion)?,
            median_completion_tokens: lower_median(&completion)?,
            avg_total_tokens: average(&total)?,
            median_total_tokens: lower_median(&total)?,
        })
    }
}

/// Percentage deviation of one quantity from the average and the median.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    pub vs_avg: f64,
    pub vs_median: f64,
}

impl Deviation {
    fn new(current: u64, avg: f64, median: u64) -> Self {
        Self {
            vs_avg: percentage_diff(current as f64, avg),
            vs_median: percentage_diff(current as f64, median as f64),
        }
    }
}

/// How one call compares to the prior history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsComparison {
    pub duration: Deviation,
    pub prompt_tokens: Deviation,
    pub completion_tokens: Deviation,
    pub total_tokens: Deviation,
    /// Statistics the deviations were computed against.
    pub statistics: MetricsStatistics,
}

impl MetricsComparison {
    /// Compares a result against precomputed statistics.
    pub fn against(current: &AiResult, statistics: MetricsStatistics) -> Self {
        Self {
            duration: Deviation::new(
                current.duration_ms,
                statistics.avg_duration_ms,
                statistics.median_duration_ms,
            ),
            prompt_tokens: Deviation::new(
                current.prompt_tokens,
                statistics.avg_prompt_tokens,
                statistics.median_prompt_tokens,
            ),
            completion_tokens: Deviation::new(
                current.completion_tokens,
                statistics.avg_completion_tokens,
                statistics.median_completion_tokens,
            ),
            total_tokens: Deviation::new(
                current.total_tokens,
                statistics.avg_total_tokens,
                statistics.median_total_tokens,
            ),
            statistics,
        }
    }
}

/// `(current - baseline) / baseline * 100`, or `0` when the baseline is zero.
pub fn percentage_diff(current: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        (current - baseline) / baseline * 100.0
    }
}

/// Element at sorted index `n / 2`.
///
/// For even-length input this is the upper of the two middle elements when
/// counting from one, i.e. `[10, 20, 30, 40]` yields `30`.
pub fn lower_median(values: &[u64]) -> Option<u64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    Some(sorted[sorted.len() / 2])
}

fn average(values: &[u64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|v| *v as f64).sum();
    Some(sum / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TokenUsage;
    use proptest::prelude::*;

    fn result(duration_ms: u64, prompt: u64, completion: u64) -> AiResult {
        AiResult::new("x", duration_ms, TokenUsage::new(prompt, completion))
    }

    #[test]
    fn lower_median_of_even_length_takes_index_half() {
        assert_eq!(lower_median(&[40, 10, 30, 20]), Some(30));
    }

    #[test]
    fn lower_median_of_odd_length_is_middle() {
        assert_eq!(lower_median(&[5, 1, 3]), Some(3));
    }

    #[test]
    fn lower_median_of_empty_is_none() {
        assert_eq!(lower_median(&[]), None);
    }

    #[test]
    fn percentage_diff_zero_baseline_is_zero() {
        assert_eq!(percentage_diff(150.0, 0.0), 0.0);
    }

    #[test]
    fn percentage_diff_computes_relative_change() {
        assert_eq!(percentage_diff(125.0, 100.0), 25.0);
        assert_eq!(percentage_diff(80.0, 100.0), -20.0);
    }

    #[test]
    fn statistics_of_empty_history_is_none() {
        assert!(MetricsStatistics::from_history(&[]).is_none());
    }

    #[test]
    fn statistics_compute_averages_and_medians() {
        let history = vec![
            result(100, 10, 20),
            result(200, 20, 40),
            result(300, 30, 60),
            result(400, 40, 80),
        ];

        let stats = MetricsStatistics::from_history(&history).unwrap();

        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.avg_duration_ms, 250.0);
        assert_eq!(stats.median_duration_ms, 300);
        assert_eq!(stats.avg_prompt_tokens, 25.0);
        assert_eq!(stats.median_prompt_tokens, 30);
        assert_eq!(stats.avg_total_tokens, 75.0);
        assert_eq!(stats.median_total_tokens, 90);
    }

    #[test]
    fn comparison_reports_deviation_against_avg_and_median() {
        let history = vec![result(100, 10, 10), result(100, 10, 10)];
        let stats = MetricsStatistics::from_history(&history).unwrap();

        let comparison = MetricsComparison::against(&result(125, 10, 5), stats);

        assert_eq!(comparison.duration.vs_avg, 25.0);
        assert_eq!(comparison.duration.vs_median, 25.0);
        assert_eq!(comparison.prompt_tokens.vs_avg, 0.0);
        assert_eq!(comparison.completion_tokens.vs_median, -50.0);
        assert_eq!(comparison.statistics.total_requests, 2);
    }

    #[test]
    fn comparison_with_zero_baseline_reports_zero() {
        let history = vec![result(0, 0, 0)];
        let stats = MetricsStatistics::from_history(&history).unwrap();

        let comparison = MetricsComparison::against(&result(500, 7, 7), stats);

        assert_eq!(comparison.duration.vs_avg, 0.0);
        assert_eq!(comparison.total_tokens.vs_median, 0.0);
    }

    proptest! {
        #[test]
        fn lower_median_matches_sorted_index(values in prop::collection::vec(0u64..100_000, 1..50)) {
            let mut sorted = values.clone();
            sorted.sort();
            prop_assert_eq!(lower_median(&values), Some(sorted[values.len() / 2]));
        }

        #[test]
        fn percentage_diff_is_finite(current in 0u64..1_000_000, baseline in 0u64..1_000_000) {
            prop_assert!(percentage_diff(current as f64, baseline as f64).is_finite());
        }

        #[test]
        fn statistics_count_every_result(durations in prop::collection::vec(0u64..10_000, 1..40)) {
            let history: Vec<AiResult> = durations.iter().map(|d| result(*d, 1, 1)).collect();
            let stats = MetricsStatistics::from_history(&history).unwrap();
            prop_assert_eq!(stats.total_requests, durations.len());
        }
    }
}
