use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::tailoring::TailorError;

/// Application-level error type for the HTTP surface.
/// Implements `IntoResponse` so handlers can return `Result<T, AppError>`.
///
/// Status mapping: model unavailability → 503, caller validation and model
/// response shape problems → 422, anything unexpected → 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Model response shape error: {0}")]
    ResponseShape(String),

    #[error("Model API unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<TailorError> for AppError {
    fn from(e: TailorError) -> Self {
        match e {
            TailorError::Validation(msg) => AppError::Validation(msg),
            TailorError::Parse(parse) => AppError::ResponseShape(parse.to_string()),
            TailorError::Llm(llm) => AppError::ModelUnavailable(llm.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                msg.clone(),
            ),
            AppError::ResponseShape(msg) => {
                tracing::error!("Model response shape error: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "RESPONSE_SHAPE_ERROR",
                    msg.clone(),
                )
            }
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model API error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MODEL_UNAVAILABLE",
                    "AI service temporarily unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{LlmError, ProviderError};
    use crate::tailoring::parser::ParseError;

    #[test]
    fn test_validation_maps_to_422() {
        let response = AppError::Validation("missing name".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_llm_error_maps_to_503() {
        let err: AppError = TailorError::Llm(LlmError::ExhaustedRetries {
            attempts: 3,
            source: ProviderError::Timeout,
        })
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_parse_error_maps_to_422() {
        let err: AppError = TailorError::Parse(ParseError::Json {
            snippet: "oops".to_string(),
        })
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_unexpected_maps_to_500() {
        let err = AppError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
