//! Data structures for authentication-related requests and responses.
//!
//! This module defines the payloads for signup, login and token refresh, and
//! the session value handed from the service to the HTTP layer.

use crate::utils::password::MAX_PASSWORD_BYTES;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Signup request payload
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Username must be between 1-255 characters"
    ))]
    pub username: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        custom(function = "validate_password_bytes")
    )]
    pub password: String,

    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,
}

fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password_too_long")
            .with_message(Cow::Borrowed("Password must be at most 72 bytes")));
    }
    Ok(())
}

/// Signup response payload
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub username: String,
}

/// Login request payload
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body returned by login and refresh
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenResponse {
    pub username: String,
    pub roles: Vec<i64>,
    /// Access token
    pub token: String,
    /// Only present when the deployment returns refresh tokens in the body
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub refresh_token: Option<String>,
}

/// Result of a successful login or refresh.
///
/// The refresh token travels separately so the transport decides how to
/// deliver it (cookie, body, or both).
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub username: String,
    pub roles: Vec<i64>,
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthSession {
    /// Converts into the response body, optionally exposing the refresh token.
    pub fn into_response(self, include_refresh_token: bool) -> TokenResponse {
        TokenResponse {
            username: self.username,
            roles: self.roles,
            token: self.access_token,
            refresh_token: include_refresh_token.then_some(self.refresh_token),
        }
    }
}

/// Response listing registered usernames
#[derive(Debug, Serialize, Deserialize)]
pub struct UsernamesResponse {
    pub usernames: Vec<String>,
}
