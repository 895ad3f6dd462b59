//! Global application error types and handlers.
//!
//! This module defines the error taxonomy of the authentication service and the
//! errors raised by its collaborators (credential store, session cache, token
//! signer and password hasher), together with the conversions that decide how
//! collaborator failures surface to callers.

use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

/// Column whose uniqueness constraint rejected an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Username => write!(f, "username"),
            UniqueField::Email => write!(f, "email"),
        }
    }
}

/// Errors raised by the credential store and role resolver.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{0} already exists")]
    Conflict(UniqueField),
    /// Any other driver or connection failure.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Errors raised by the session cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No live entry for the key (never stored, expired or removed).
    #[error("Cache entry not found")]
    NotFound,
    /// The cache backend itself failed.
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Errors raised while signing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature is valid but the `exp` claim is in the past.
    #[error("Token has expired")]
    Expired,
    /// Malformed token, bad signature or missing claims.
    #[error("Invalid token: {0}")]
    Invalid(String),
    /// The token could not be produced.
    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Errors raised by the password hasher.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("Password hashing task failed: {0}")]
    Task(String),
}

/// Error taxonomy exposed by the authentication service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("username is already exist: {username}")]
    DuplicateUsername { username: String },

    #[error("email is already exist: {email}")]
    DuplicateEmail { email: String },

    /// Deliberately carries no detail about which field was wrong.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn duplicate_username(username: impl Into<String>) -> Self {
        Self::DuplicateUsername {
            username: username.into(),
        }
    }

    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Collapses `validator` field errors into a single, stable message.
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();
        messages.sort();

        Self::validation(messages.join(", "))
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        ServiceError::internal_error(error.to_string())
    }
}

impl From<CacheError> for ServiceError {
    fn from(error: CacheError) -> Self {
        ServiceError::internal_error(error.to_string())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(error: PasswordError) -> Self {
        ServiceError::internal_error(error.to_string())
    }
}
