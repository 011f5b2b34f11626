//! Track Bot - LLM relay chat bot
//!
//! Relays chat questions to LLM providers (Claude, YandexGPT, HuggingFace)
//! with per-conversation context compression, call metrics, multi-strategy
//! answer orchestration and a guided music track finder.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
