//! Application layer - Bot flows and their handlers.
//!
//! This layer drives domain types through the ports. The [`Dispatcher`]
//! routes inbound chat events to the handlers and orchestrators.

mod ask;
mod commands;
mod context_manager;
mod dispatcher;
mod errors;
mod find_track;
mod formatting;
mod json_answer;
mod metrics_settings;
pub mod orchestrators;
mod reply;

pub use ask::{AskCommand, AskHandler, ASK_TEMPERATURE};
pub use commands::{parse_input, BotCommand, ParsedInput, Toggle};
pub use context_manager::{compression_prompt, ContextManager, COMPRESSION_TEMPERATURE};
pub use dispatcher::{BotServices, ConversationGuard, ConversationLocks, Dispatcher};
pub use errors::InteractionError;
pub use find_track::FindTrackHandler;
pub use formatting::{answer_with_metrics, format_deviation, provider_metrics, SEPARATOR};
pub use json_answer::{JsonAnswerHandler, StructuredAnswer, JSON_TEMPERATURE};
pub use metrics_settings::MetricsSettings;
pub use orchestrators::{
    ExpertsOrchestrator, ModelSlot, MultiModelOrchestrator, TemperatureSweepOrchestrator,
};
pub use reply::Reply;
