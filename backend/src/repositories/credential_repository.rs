//! Database repository for user credentials.
//!
//! Provides the credential store used by signup and login:
//! - Account insert guarded by the table's unique constraints
//! - Duplicate detection by username or email
//! - Credential lookup by username
//! - Username listing

use crate::database::models::{Account, IdentityMatch, StoredCredential};
use crate::errors::{StoreError, UniqueField};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Persistence capability for account credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a new account.
    ///
    /// # Errors
    /// `StoreError::Conflict` when the username or email is already taken,
    /// `StoreError::Storage` for any other failure.
    async fn create(&self, account: &Account) -> Result<(), StoreError>;

    /// Returns the first row matching either field, preferring a username match.
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<IdentityMatch>, StoreError>;

    /// Returns the stored credential for `username`, if any.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<StoredCredential>, StoreError>;

    /// Returns every username in insertion order.
    async fn find_all_usernames(&self) -> Result<Vec<String>, StoreError>;
}

/// SQLite-backed credential store over the `user_credential` table.
#[derive(Clone)]
pub struct CredentialRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl CredentialRepository {
    /// Creates a new CredentialRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for CredentialRepository {
    async fn create(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_credential (username, password, email, created_date, updated_date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(&account.email)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(classify_write_error)?;

        Ok(())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<IdentityMatch>, StoreError> {
        let found = sqlx::query_as::<_, IdentityMatch>(
            r#"
            SELECT username, email
            FROM user_credential
            WHERE username = ? OR email = ?
            ORDER BY CASE WHEN username = ? THEN 0 ELSE 1 END, id
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredential>, StoreError> {
        let credential = sqlx::query_as::<_, StoredCredential>(
            "SELECT username, password FROM user_credential WHERE username = ? LIMIT 1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    async fn find_all_usernames(&self) -> Result<Vec<String>, StoreError> {
        let usernames =
            sqlx::query_scalar::<_, String>("SELECT username FROM user_credential ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(usernames)
    }
}

/// Maps unique-constraint violations to the column that caused them.
fn classify_write_error(error: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            let field = if db_error.message().contains("user_credential.email") {
                UniqueField::Email
            } else {
                UniqueField::Username
            };
            return StoreError::Conflict(field);
        }
    }
    StoreError::Storage(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use chrono::Utc;

    async fn repository() -> CredentialRepository {
        let db = Database::in_memory().await.unwrap();
        CredentialRepository::new(db.pool().clone())
    }

    fn account(username: &str, email: &str) -> Account {
        Account::new(username, email, "$2b$04$hash", Utc::now())
    }

    #[tokio::test]
    async fn test_create_and_find_by_username() {
        let repo = repository().await;
        repo.create(&account("alice", "a@x.com")).await.unwrap();

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert_eq!(found.password_hash, "$2b$04$hash");
        assert!(found.is_usable());

        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_constraints_report_column() {
        let repo = repository().await;
        repo.create(&account("alice", "a@x.com")).await.unwrap();

        let err = repo.create(&account("alice", "b@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Username)));

        let err = repo.create(&account("bob", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::Email)));
    }

    #[tokio::test]
    async fn test_find_by_username_or_email_prefers_username_match() {
        let repo = repository().await;
        repo.create(&account("bob", "shared@x.com")).await.unwrap();
        repo.create(&account("alice", "a@x.com")).await.unwrap();

        let found = repo
            .find_by_username_or_email("alice", "shared@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.username, "alice");

        let found = repo
            .find_by_username_or_email("carol", "shared@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            found,
            IdentityMatch {
                username: "bob".into(),
                email: "shared@x.com".into()
            }
        );

        assert!(
            repo.find_by_username_or_email("carol", "c@x.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_find_all_usernames_in_insertion_order() {
        let repo = repository().await;
        assert!(repo.find_all_usernames().await.unwrap().is_empty());

        for (name, email) in [("zed", "z@x.com"), ("alice", "a@x.com"), ("mia", "m@x.com")] {
            repo.create(&account(name, email)).await.unwrap();
        }

        assert_eq!(
            repo.find_all_usernames().await.unwrap(),
            vec!["zed", "alice", "mia"]
        );
    }
}
