use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::sequencer::{render_causes, AnalysisError};
use crate::llm_client::AdapterError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No provider credential configured")]
    NoProviderConfigured,

    #[error("All providers failed:\n{}", render_causes(.0))]
    AllProvidersFailed(Vec<AdapterError>),
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::PreconditionFailed => AppError::NoProviderConfigured,
            AnalysisError::TotalFailure(causes) => AppError::AllProvidersFailed(causes),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, attempts) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::NoProviderConfigured => (
                StatusCode::BAD_REQUEST,
                "NO_PROVIDER_CONFIGURED",
                "Provide at least one provider API key".to_string(),
                None,
            ),
            AppError::AllProvidersFailed(causes) => {
                tracing::error!("{self}");
                (
                    StatusCode::BAD_GATEWAY,
                    "ALL_PROVIDERS_FAILED",
                    format!(
                        "All {} configured providers failed:\n{}",
                        causes.len(),
                        render_causes(causes)
                    ),
                    Some(causes.clone()),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(attempts) = attempts {
            error["attempts"] = json!(attempts);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
