//! Error types for pulso-rs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error on {field}: {message}")]
    FieldValidation { field: String, message: String },

    // === Geolocation Errors ===
    #[error("Location permission denied")]
    GeolocationDenied,

    #[error("Location unavailable: {0}")]
    GeolocationUnavailable(String),

    #[error("Location request timed out")]
    GeolocationTimeout,

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::ReportNotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) | Self::GeolocationDenied => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Validation(_) | Self::FieldValidation { .. } => {
                StatusCode::BAD_REQUEST
            }

            // 5xx Server Errors
            Self::GeolocationUnavailable(_) | Self::ExternalService(_) => StatusCode::BAD_GATEWAY,
            Self::GeolocationTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::ReportNotFound(_) => "REPORT_NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) | Self::FieldValidation { .. } => "VALIDATION_ERROR",
            Self::GeolocationDenied => "GEOLOCATION_DENIED",
            Self::GeolocationUnavailable(_) => "GEOLOCATION_UNAVAILABLE",
            Self::GeolocationTimeout => "GEOLOCATION_TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the offending field for field-scoped validation errors.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::FieldValidation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let mut error = json!({
            "code": code,
            "message": self.to_string(),
        });
        if let Some(field) = self.field() {
            error["field"] = json!(field);
        }

        let body = Json(json!({ "error": error }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        // Surface the first failing field so clients can attach the
        // message to the matching input.
        let mut fields: Vec<_> = err.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        for (field, errors) in fields {
            if let Some(first) = errors.first() {
                let message = first
                    .message
                    .as_ref()
                    .map_or_else(|| first.code.to_string(), ToString::to_string);
                return Self::FieldValidation {
                    field: field.to_string(),
                    message,
                };
            }
        }

        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Input {
        #[validate(length(min = 10, message = "must be at least 10 characters"))]
        description: String,
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::ReportNotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::GeolocationDenied.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::GeolocationTimeout.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AppError::GeolocationUnavailable("no fix".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Database("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_errors_carry_field() {
        let input = Input {
            description: "short".to_string(),
        };
        let err: AppError = input.validate().unwrap_err().into();

        assert_eq!(err.field(), Some("description"));
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
