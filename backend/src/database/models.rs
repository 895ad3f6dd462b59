//! Rust structs that represent database table mappings.
//!
//! Lookups return narrow fragments of a row rather than the whole record, and
//! callers receive them wrapped in `Option` so "not found" is never confused
//! with a row that happens to have empty columns.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A registered account as stored in `user_credential`.
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// New account stamped with a single creation instant.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Identity columns of an existing row, used for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct IdentityMatch {
    pub username: String,
    pub email: String,
}

/// Columns needed to check a login attempt.
#[derive(Debug, Clone, FromRow)]
pub struct StoredCredential {
    pub username: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

impl StoredCredential {
    /// A fragment with blank columns can never authenticate.
    pub fn is_usable(&self) -> bool {
        !self.username.is_empty() && !self.password_hash.is_empty()
    }
}

