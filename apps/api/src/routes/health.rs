use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// GET /health
/// Liveness signal for container orchestration and the worker process.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "llm-service",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().timestamp()
    }))
}
