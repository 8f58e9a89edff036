//! Unified API error handling.
//!
//! Every error leaves the process as the standard envelope
//! `{"success": false, "error": <category label>, "message": <detail>}`
//! with the HTTP status carrying the machine-readable signal.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::store::StoreError;

/// Error categories and their HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    InternalError,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short category label placed in the `error` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "Validation Error",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::Forbidden => "Forbidden",
            ErrorCode::NotFound => "Not Found",
            ErrorCode::Conflict => "Conflict",
            ErrorCode::InternalError => "Internal Server Error",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Validation error (400)
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Unauthorized error (401) - authentication required
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Forbidden error (403) - authenticated but not allowed
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Not found error (404)
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Conflict error (409) - uniqueness violation on a derived slug/name
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Internal server error (500). The given message is what the client
    /// sees; keep the real cause in the logs.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let envelope = ErrorEnvelope {
            success: false,
            error: self.code.as_str(),
            message: self.message,
        };
        (self.code.status_code(), Json(envelope)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(m) => write!(f, "[{}] {}", self.code.as_str(), m),
            None => f.write_str(self.code.as_str()),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => ApiError::not_found(format!("{} not found", entity)),
            StoreError::Forbidden(message) => ApiError::forbidden(message),
            StoreError::Conflict(message) => ApiError::conflict(message),
            StoreError::Policy(message) => ApiError::validation(message),
            StoreError::Database(e) => ApiError::from(e),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", err);

        match &err {
            sqlx::Error::RowNotFound => ApiError::not_found("Resource not found"),
            sqlx::Error::Database(db_err)
                if db_err.code().as_deref() == Some("23505") =>
            {
                ApiError::conflict("A record with this identifier already exists")
            }
            // The real cause stays in the logs; clients in release builds
            // get a generic message.
            _ if cfg!(debug_assertions) => ApiError::internal(err.to_string()),
            _ => ApiError::internal("An unexpected error occurred"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_codes() {
        assert_eq!(
            ErrorCode::ValidationError.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::not_found("Content not found");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), Some("Content not found"));
    }

    #[test]
    fn test_store_error_mapping() {
        let err: ApiError = StoreError::NotFound("Category").into();
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err: ApiError = StoreError::Conflict("duplicate slug").into();
        assert_eq!(err.code(), ErrorCode::Conflict);

        let err: ApiError = StoreError::Policy("has children").into();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let err: ApiError = StoreError::Forbidden("not yours").into();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = ErrorEnvelope {
            success: false,
            error: ErrorCode::Conflict.as_str(),
            message: Some("A content with similar title already exists".to_string()),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Conflict");
        assert!(json["message"].as_str().unwrap().contains("similar title"));
    }
}
