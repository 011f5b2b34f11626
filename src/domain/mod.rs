//! Domain layer containing bot logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (conversation ids, errors, state machine)
//! - `metrics` - Call history, statistics and comparisons
//! - `context` - Per-conversation transcript with periodic summarisation
//! - `find_track` - Guided music recommendation flow

pub mod context;
pub mod find_track;
pub mod foundation;
pub mod metrics;
