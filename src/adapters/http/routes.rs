//! Route configuration for the HTTP endpoint.

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{ask, hello, AskAppState};

/// Creates the router.
///
/// Routes:
/// - `GET /` - Liveness text
/// - `GET /ask?question=...` - Plain-text answer from the primary provider
pub fn ask_router(state: AskAppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/ask", get(ask))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
