//! HTTP handlers.
//!
//! Plain-text endpoints that relay a single question to the primary provider.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{error, info};

use crate::domain::foundation::ValidationError;
use crate::ports::{AiClient, AiRequest};

use super::dto::AskQuery;

/// Temperature for questions asked over HTTP.
pub const HTTP_ASK_TEMPERATURE: f32 = 1.0;

/// Shared state of the HTTP endpoint.
#[derive(Clone)]
pub struct AskAppState {
    pub client: Arc<dyn AiClient>,
    pub max_question_length: usize,
}

impl AskAppState {
    pub fn new(client: Arc<dyn AiClient>, max_question_length: usize) -> Self {
        Self {
            client,
            max_question_length,
        }
    }
}

/// GET /
pub async fn hello() -> &'static str {
    "Hello World!"
}

/// Answer one question.
///
/// GET /ask?question=...
pub async fn ask(
    State(state): State<AskAppState>,
    Query(query): Query<AskQuery>,
) -> impl IntoResponse {
    let Some(question) = query.question else {
        return (StatusCode::BAD_REQUEST, "Missing 'question' parameter".to_string());
    };

    match ValidationError::check_question(&question, state.max_question_length) {
        Ok(()) => {}
        Err(ValidationError::MessageTooLong { .. }) => {
            return (
                StatusCode::BAD_REQUEST,
                format!(
                    "Question exceeds maximum length of {} characters",
                    state.max_question_length
                ),
            );
        }
        Err(_) => {
            return (StatusCode::BAD_REQUEST, "Missing 'question' parameter".to_string());
        }
    }

    let request = match AiRequest::user(question, HTTP_ASK_TEMPERATURE) {
        Ok(request) => request,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()),
    };

    match state.client.send(request).await {
        Ok(result) => {
            info!(duration_ms = result.duration_ms, "Answered HTTP question");
            (StatusCode::OK, result.content)
        }
        Err(err) => {
            error!(error = %err, "HTTP question failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error communicating with AI service: {}", err),
            )
        }
    }
}
