use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::DocumentBuildError;
use crate::ledger::LedgerError;
use crate::llm_client::CompletionError;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequiredField(Vec<&'static str>),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Document build error: {0}")]
    DocumentBuild(#[from] DocumentBuildError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::MissingRequiredField(_) => (StatusCode::BAD_REQUEST, "MISSING_REQUIRED_FIELD"),
            AppError::Completion(CompletionError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "COMPLETION_TIMEOUT")
            }
            AppError::Completion(_) => (StatusCode::BAD_GATEWAY, "COMPLETION_ERROR"),
            AppError::DocumentBuild(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DOCUMENT_BUILD_ERROR"),
            AppError::Ledger(_) => (StatusCode::CONFLICT, "LEDGER_ERROR"),
            AppError::Session(_) => (StatusCode::SERVICE_UNAVAILABLE, "SESSION_LIMIT"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();

        let message = match &self {
            AppError::NotFound(msg) | AppError::Validation(msg) => msg.clone(),
            AppError::MissingRequiredField(fields) => {
                format!("Please fill in: {}", fields.join(", "))
            }
            AppError::Completion(e) => {
                tracing::error!("Completion error: {e}");
                e.to_string()
            }
            AppError::DocumentBuild(e) => {
                tracing::error!("Document build error: {e}");
                e.to_string()
            }
            AppError::Ledger(e) => {
                tracing::error!("Ledger error: {e}");
                e.to_string()
            }
            AppError::Session(e) => {
                tracing::warn!("Session error: {e}");
                e.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::MissingRequiredField(fields) = &self {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

// Extractor rejections become 400s in the standard envelope.

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::Value;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_fields_are_listed() {
        let (status, body) = body_of(AppError::MissingRequiredField(vec!["full_name", "note"])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");
        assert_eq!(body["error"]["fields"], json!(["full_name", "note"]));
    }

    #[tokio::test]
    async fn test_completion_error_is_surfaced_verbatim() {
        let err = AppError::Completion(CompletionError::Api {
            status: 401,
            message: "Invalid API Key".to_string(),
        });
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body["error"]["message"],
            "API error (status 401): Invalid API Key"
        );
    }

    #[tokio::test]
    async fn test_timeout_maps_to_gateway_timeout() {
        let err = AppError::Completion(CompletionError::Timeout(std::time::Duration::from_secs(60)));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["code"], "COMPLETION_TIMEOUT");
    }

    #[tokio::test]
    async fn test_internal_error_is_not_leaked() {
        let (status, body) = body_of(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "An internal server error occurred");
    }

    #[tokio::test]
    async fn test_session_limit_is_service_unavailable() {
        let (status, body) = body_of(AppError::Session(SessionError::Capacity(2))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "SESSION_LIMIT");
    }
}
