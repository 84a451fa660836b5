use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use crate::domain::error::DomainError;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } | DomainError::NotFoundMany { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, err.to_string())
            }
            DomainError::Validation { field, message } => {
                ApiError::new(StatusCode::BAD_REQUEST, "Validation failed")
                    .with_details(vec![format!("{field}: {message}")])
            }
            DomainError::Database { message } => {
                error!(%message, "Storage failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Unexpected error")
            }
        }
    }
}
