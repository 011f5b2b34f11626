//! Rendering of answers with performance metrics.

use crate::domain::metrics::{Deviation, MetricsComparison};
use crate::ports::AiResult;

/// Horizontal rule between an answer and its metrics.
pub const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━";

/// Deviation above which a value is flagged as worse.
const BADGE_THRESHOLD_PERCENT: f64 = 10.0;

fn badge(percent: f64) -> &'static str {
    if percent > BADGE_THRESHOLD_PERCENT {
        "🔴"
    } else if percent < -BADGE_THRESHOLD_PERCENT {
        "🟢"
    } else {
        "⚪"
    }
}

fn signed(percent: f64) -> String {
    if percent > 0.0 {
        format!("+{:.0}", percent)
    } else {
        format!("{:.0}", percent)
    }
}

/// Formats a deviation as `(🔴+25% avg, ⚪+3% 50p)`.
pub fn format_deviation(deviation: &Deviation) -> String {
    format!(
        "({}{}% avg, {}{}% 50p)",
        badge(deviation.vs_avg),
        signed(deviation.vs_avg),
        badge(deviation.vs_median),
        signed(deviation.vs_median)
    )
}

fn seconds(duration_ms: f64) -> String {
    format!("{:.2}", duration_ms / 1000.0)
}

/// Answer followed by current metrics compared to history.
///
/// Without a comparison (empty history) the first-request variant is used.
pub fn answer_with_metrics(result: &AiResult, comparison: Option<&MetricsComparison>) -> String {
    let time = seconds(result.duration_ms as f64);

    match comparison {
        Some(comparison) => {
            let stats = &comparison.statistics;
            format!(
                "{content}\n\n{SEPARATOR}\n\
                 📊 *Current Metrics:*\n\
                 ⏱️ Time: {time}s {duration}\n\
                 📥 Prompt tokens: {prompt} {prompt_dev}\n\
                 📤 Completion tokens: {completion} {completion_dev}\n\
                 📊 Total tokens: {total} {total_dev}\n\n\
                 📈 *Historical Stats ({requests} requests):*\n\
                 ⏱️ Avg: {avg_time}s | Median: {median_time}s\n\
                 📊 Avg tokens: {avg_tokens:.0} | Median: {median_tokens}",
                content = result.content,
                duration = format_deviation(&comparison.duration),
                prompt = result.prompt_tokens,
                prompt_dev = format_deviation(&comparison.prompt_tokens),
                completion = result.completion_tokens,
                completion_dev = format_deviation(&comparison.completion_tokens),
                total = result.total_tokens,
                total_dev = format_deviation(&comparison.total_tokens),
                requests = stats.total_requests,
                avg_time = seconds(stats.avg_duration_ms),
                median_time = seconds(stats.median_duration_ms as f64),
                avg_tokens = stats.avg_total_tokens,
                median_tokens = stats.median_total_tokens,
            )
        }
        None => format!(
            "{content}\n\n{SEPARATOR}\n\
             📊 *Metrics:*\n\
             ⏱️ Time: {time}s\n\
             📥 Prompt tokens: {prompt}\n\
             📤 Completion tokens: {completion}\n\
             📊 Total tokens: {total}\n\n\
             ℹ️ First request - no historical data yet",
            content = result.content,
            prompt = result.prompt_tokens,
            completion = result.completion_tokens,
            total = result.total_tokens,
        ),
    }
}

/// Compact per-provider metrics used by the multi-model comparison.
pub fn provider_metrics(result: &AiResult) -> String {
    format!(
        "📊 *Metrics:*\n⏱️ Time: {}s ({}ms)\n🔢 Tokens: {} total ({} prompt + {} completion)",
        seconds(result.duration_ms as f64),
        result.duration_ms,
        result.total_tokens,
        result.prompt_tokens,
        result.completion_tokens
    )
}
