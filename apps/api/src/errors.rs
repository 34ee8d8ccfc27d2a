use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::outline::generator::GenerationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// This is where generation failures become user-facing responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Multipart(e) => (e.status(), "INVALID_MULTIPART", e.body_text()),
            AppError::Generation(e) => generation_error_parts(e),
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

fn generation_error_parts(error: &GenerationError) -> (StatusCode, &'static str, String) {
    match error {
        GenerationError::Config(e) => {
            tracing::error!("Provider config error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "Text provider configuration is invalid".to_string(),
            )
        }
        GenerationError::Client(
            e @ (LlmError::UnsupportedProvider(_) | LlmError::MissingApiKey(_)),
        ) => {
            tracing::error!("Text client setup error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                e.to_string(),
            )
        }
        GenerationError::TemplateLoad { .. } | GenerationError::Template(_) => {
            tracing::error!("Prompt template error: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TEMPLATE_ERROR",
                "The outline prompt template could not be used".to_string(),
            )
        }
        GenerationError::Client(e) => {
            tracing::error!("LLM error: {e}");
            (
                StatusCode::BAD_GATEWAY,
                "LLM_ERROR",
                format!("Outline generation failed: {e}"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::prompts::TemplateError;

    fn status_of(error: AppError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn test_validation_is_bad_request() {
        assert_eq!(
            status_of(AppError::Validation("topic cannot be empty".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_provider_failure_is_bad_gateway() {
        let error = GenerationError::Client(LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        });
        let (status, code, message) = generation_error_parts(&error);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "LLM_ERROR");
        assert!(message.contains("overloaded"));
    }

    #[test]
    fn test_client_setup_failure_is_config_error() {
        let error = GenerationError::Client(LlmError::MissingApiKey("google_gemini".to_string()));
        let (status, code, _) = generation_error_parts(&error);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "CONFIG_ERROR");
    }

    #[test]
    fn test_template_failure_is_internal() {
        let error = GenerationError::Template(TemplateError::UnbalancedBrace(0));
        let (status, code, _) = generation_error_parts(&error);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "TEMPLATE_ERROR");
    }
}
