//! Metrics - latency and token usage history with comparisons.

mod collector;
mod statistics;

pub use collector::{record_call, MetricsCollector};
pub use statistics::{
    lower_median, percentage_diff, Deviation, MetricsComparison, MetricsStatistics,
};
