//! API error taxonomy
//!
//! Every handler returns `Result<HttpResponse, ApiError>`. The error renders as
//! `{"error": "..."}` with the status matching its variant.

use std::fmt::Display;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid session
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Caller is signed in but its role lacks the permission
    #[error("{0}")]
    Forbidden(&'static str),

    /// Referenced entity is absent
    #[error("{0}")]
    NotFound(&'static str),

    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Store or filesystem failure; the message is fixed per operation
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

/// Collapse any failure into `ApiError::Internal` with a fixed message,
/// logging the real cause server side.
pub trait OrInternal<T> {
    fn or_internal(self, msg: &'static str) -> Result<T, ApiError>;
}

impl<T, E: Display> OrInternal<T> for Result<T, E> {
    fn or_internal(self, msg: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::error!("{}: {}", msg, e);
            ApiError::Internal(msg)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_error_body_shape() {
        let resp = ApiError::NotFound("Album not found").error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({ "error": "Album not found" }));
    }

    #[test]
    fn test_or_internal_hides_cause() {
        let failed: Result<(), String> = Err("disk on fire".to_string());
        let err = failed.or_internal("Error fetching albums").unwrap_err();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Error fetching albums");
    }
}
