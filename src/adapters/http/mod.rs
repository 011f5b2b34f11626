//! HTTP adapter - plain-text question endpoint.
//!
//! - `GET /` - Liveness text
//! - `GET /ask?question=...` - Answer from the primary provider

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AskAppState, HTTP_ASK_TEMPERATURE};
pub use routes::ask_router;
