pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::tailoring::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Structured tailoring: resume + job objects in, TailorResponse out
        .route("/api/v1/resume/tailor", post(handlers::handle_tailor_resume))
        // Simple flow: raw resume/job text in, four labeled sections out
        .route(
            "/api/v1/resume/tailor/text",
            post(handlers::handle_tailor_text),
        )
        .with_state(state)
}
