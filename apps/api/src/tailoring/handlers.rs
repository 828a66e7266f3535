//! Axum handlers for the tailoring endpoints. Thin wrappers: decode, call
//! the service, map errors through `AppError`.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::models::job::{TailoringOptions, TailorRequest, TailorResponse};
use crate::state::AppState;

/// POST /api/v1/resume/tailor
/// Structured flow: tailors a resume object for a job posting and returns
/// the normalized result with fit score and suggestions.
pub async fn handle_tailor_resume(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    info!(
        candidate = %request.resume.name,
        company = %request.job.company,
        role = %request.job.title,
        "Received tailoring request"
    );

    let options = request.options.unwrap_or_default();
    let response = state
        .tailor
        .tailor(&request.resume, &request.job, &options)
        .await?;

    Ok(Json(response))
}

/// Request body for the simple raw-text flow.
#[derive(Debug, Deserialize)]
pub struct TailorTextRequest {
    pub resume: String,
    pub job_desc: String,
    #[serde(default)]
    pub options: Option<TailoringOptions>,
}

/// POST /api/v1/resume/tailor/text
/// Simple flow: raw resume and job description text in, the four labeled
/// sections out.
pub async fn handle_tailor_text(
    State(state): State<AppState>,
    Json(request): Json<TailorTextRequest>,
) -> Result<Json<Value>, AppError> {
    let options = request.options.unwrap_or_default();
    let outcome = state
        .tailor
        .tailor_text(&request.resume, &request.job_desc, &options)
        .await?;

    Ok(Json(json!({
        "status": "success",
        "role_fit": outcome.sections.role_fit,
        "experience_justification": outcome.sections.experience_justification,
        "summary": outcome.sections.summary,
        "tailored_resume": outcome.sections.tailored_resume,
        "tokens_used": outcome.tokens_used,
        "llm_model_used": outcome.model,
    })))
}
