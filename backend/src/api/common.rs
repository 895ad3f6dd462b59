//! Error handling utilities for API responses.
//!
//! Provides the standard response envelope and the conversion between
//! service-layer errors and HTTP responses.
//!
//! # Response Format
//! Every response carries:
//! - `success`: whether the request succeeded
//! - `message`: short human-readable message
//! - `data`: payload on success
//! - `error.error_type`: machine-readable error category on failure
//!
//! # Error Handling Flow
//! 1. Service layer returns a `ServiceError`
//! 2. `service_error_to_http` converts it to a status code and envelope
//! 3. Internal failures are logged and replaced by a fixed message

use crate::errors::ServiceError;
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Response timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
}

/// Error half of every handler's return type.
pub type HttpError = (StatusCode, Json<ApiResponse<()>>);

pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "internal server error";

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a successful response with default message
    pub fn ok(data: T) -> Self {
        Self::success(data, "success")
    }

    /// Create an error response
    pub fn error(message: impl Into<String>, error_type: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Builds an error response outside the service layer (e.g. missing cookie).
pub fn http_error(status: StatusCode, error_type: &str, message: impl Into<String>) -> HttpError {
    (status, Json(ApiResponse::<()>::error(message, error_type)))
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> HttpError {
    let (status, error_type, message) = match error {
        ServiceError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "validation_error", message)
        }
        ServiceError::DuplicateUsername { .. } => (
            StatusCode::BAD_REQUEST,
            "duplicate_username",
            "username is already exist".to_string(),
        ),
        ServiceError::DuplicateEmail { .. } => (
            StatusCode::BAD_REQUEST,
            "duplicate_email",
            "email is already exist".to_string(),
        ),
        ServiceError::InvalidCredentials => (
            StatusCode::BAD_REQUEST,
            "invalid_credentials",
            ServiceError::InvalidCredentials.to_string(),
        ),
        ServiceError::InvalidToken { .. } => (
            StatusCode::BAD_REQUEST,
            "invalid_token",
            "invalid token".to_string(),
        ),
        ServiceError::Unauthorized { message } => {
            (StatusCode::UNAUTHORIZED, "unauthorized", message)
        }
        ServiceError::InternalError { message } => {
            tracing::error!("Internal error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                INTERNAL_SERVER_ERROR_MESSAGE.to_string(),
            )
        }
    };

    http_error(status, error_type, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ServiceError::validation("bad"), StatusCode::BAD_REQUEST),
            (ServiceError::duplicate_username("alice"), StatusCode::BAD_REQUEST),
            (ServiceError::duplicate_email("a@x.com"), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidCredentials, StatusCode::BAD_REQUEST),
            (ServiceError::invalid_token("bad"), StatusCode::BAD_REQUEST),
            (ServiceError::unauthorized("gone"), StatusCode::UNAUTHORIZED),
            (
                ServiceError::internal_error("db down"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let (status, Json(body)) = service_error_to_http(error);
            assert_eq!(status, expected);
            assert!(!body.success);
            assert!(body.error.is_some());
        }
    }

    #[test]
    fn test_internal_error_text_is_hidden() {
        let (_, Json(body)) =
            service_error_to_http(ServiceError::internal_error("UNIQUE constraint failed"));

        assert_eq!(body.message, INTERNAL_SERVER_ERROR_MESSAGE);
        assert_eq!(body.error.unwrap().error_type, "internal_error");
    }

    #[test]
    fn test_success_envelope() {
        let response = ApiResponse::ok(vec!["alice"]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "success");
        assert_eq!(json["data"][0], "alice");
        assert!(json.get("error").is_none());
    }
}
