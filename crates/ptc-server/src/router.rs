use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all PTC endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/api/sessionEvents/:number", get(handler::session_event_handler))
        .route("/api/classes", get(handler::classes_handler))
        .route("/api/evalCode/:code", get(handler::eval_code_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
