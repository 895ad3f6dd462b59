//! User business logic service.
//!
//! Handles registration and credential checks against the credential store.

use crate::database::models::Account;
use crate::errors::{PasswordError, ServiceError, ServiceResult, StoreError, UniqueField};
use crate::repositories::credential_repository::CredentialStore;
use crate::utils::password::PasswordHasher;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct UserService {
    /// Credential persistence
    credentials: Arc<dyn CredentialStore>,
    /// Password hasher with the configured work factor
    hasher: PasswordHasher,
}

impl UserService {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `credentials` - Credential store implementation
    /// * `hasher` - Password hasher
    pub fn new(credentials: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Self {
        Self {
            credentials,
            hasher,
        }
    }

    /// Registers a new account.
    ///
    /// Inputs are expected to be validated by the caller.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - `DuplicateUsername` when the username is taken (checked before email)
    /// - `DuplicateEmail` when the email is taken
    /// - `InternalError` for storage or hashing failures
    pub async fn signup(&self, username: &str, password: &str, email: &str) -> ServiceResult<()> {
        self.ensure_not_registered(username, email).await?;

        let password_hash = self.hash_password(password).await.map_err(|e| {
            error!("Password hashing failed during signup: {}", e);
            ServiceError::from(e)
        })?;

        let account = Account::new(username, email, password_hash, Utc::now());

        // The unique constraints catch a concurrent signup that slipped past the check above.
        match self.credentials.create(&account).await {
            Ok(()) => {
                info!("Account created for {}", username);
                Ok(())
            }
            Err(StoreError::Conflict(UniqueField::Username)) => {
                Err(ServiceError::duplicate_username(username))
            }
            Err(StoreError::Conflict(UniqueField::Email)) => {
                Err(ServiceError::duplicate_email(email))
            }
            Err(e) => {
                error!("Failed to create account: {}", e);
                Err(e.into())
            }
        }
    }

    /// Verifies a username/password pair.
    ///
    /// Unknown usernames, unusable rows and wrong passwords all yield the same
    /// `InvalidCredentials` error.
    pub async fn authenticate_user(&self, username: &str, password: &str) -> ServiceResult<()> {
        let credential = self
            .credentials
            .find_by_username(username)
            .await
            .map_err(|e| {
                error!("Credential lookup failed: {}", e);
                ServiceError::from(e)
            })?;

        let Some(credential) = credential.filter(|c| c.is_usable()) else {
            warn!("Login rejected for {}: unknown user", username);
            return Err(ServiceError::InvalidCredentials);
        };

        if !self
            .verify_password(credential.password_hash, password.to_string())
            .await?
        {
            warn!("Login rejected for {}: password mismatch", username);
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(())
    }

    /// Returns every registered username.
    pub async fn list_usernames(&self) -> ServiceResult<Vec<String>> {
        self.credentials.find_all_usernames().await.map_err(|e| {
            error!("Failed to list usernames: {}", e);
            ServiceError::from(e)
        })
    }

    async fn ensure_not_registered(&self, username: &str, email: &str) -> ServiceResult<()> {
        let existing = self
            .credentials
            .find_by_username_or_email(username, email)
            .await
            .map_err(|e| {
                error!("Duplicate check failed: {}", e);
                ServiceError::from(e)
            })?;

        match existing {
            Some(found) if found.username == username => {
                Err(ServiceError::duplicate_username(username))
            }
            Some(found) if found.email == email => Err(ServiceError::duplicate_email(email)),
            _ => Ok(()),
        }
    }

    /// bcrypt is CPU bound, so it runs off the async workers.
    async fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = self.hasher;
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    async fn verify_password(&self, password_hash: String, password: String) -> ServiceResult<bool> {
        let hasher = self.hasher;

        tokio::task::spawn_blocking(move || hasher.verify(&password_hash, &password))
            .await
            .map_err(|e| {
                error!("Password verification task failed: {}", e);
                ServiceError::internal_error(e.to_string())
            })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::models::{IdentityMatch, StoredCredential};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// In-memory credential store enforcing the same unique columns as the table.
    #[derive(Default)]
    pub(crate) struct MemoryCredentialStore {
        accounts: Mutex<Vec<Account>>,
        pub(crate) skip_lookup: bool,
        pub(crate) fail: bool,
    }

    #[async_trait]
    impl CredentialStore for MemoryCredentialStore {
        async fn create(&self, account: &Account) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Storage(sqlx::Error::PoolTimedOut));
            }
            let mut accounts = self.accounts.lock().await;
            if accounts.iter().any(|a| a.username == account.username) {
                return Err(StoreError::Conflict(UniqueField::Username));
            }
            if accounts.iter().any(|a| a.email == account.email) {
                return Err(StoreError::Conflict(UniqueField::Email));
            }
            accounts.push(account.clone());
            Ok(())
        }

        async fn find_by_username_or_email(
            &self,
            username: &str,
            email: &str,
        ) -> Result<Option<IdentityMatch>, StoreError> {
            if self.fail {
                return Err(StoreError::Storage(sqlx::Error::PoolTimedOut));
            }
            if self.skip_lookup {
                return Ok(None);
            }
            let accounts = self.accounts.lock().await;
            let found = accounts
                .iter()
                .find(|a| a.username == username)
                .or_else(|| accounts.iter().find(|a| a.email == email))
                .map(|a| IdentityMatch {
                    username: a.username.clone(),
                    email: a.email.clone(),
                });
            Ok(found)
        }

        async fn find_by_username(
            &self,
            username: &str,
        ) -> Result<Option<StoredCredential>, StoreError> {
            if self.fail {
                return Err(StoreError::Storage(sqlx::Error::PoolTimedOut));
            }
            let accounts = self.accounts.lock().await;
            Ok(accounts
                .iter()
                .find(|a| a.username == username)
                .map(|a| StoredCredential {
                    username: a.username.clone(),
                    password_hash: a.password_hash.clone(),
                }))
        }

        async fn find_all_usernames(&self) -> Result<Vec<String>, StoreError> {
            if self.fail {
                return Err(StoreError::Storage(sqlx::Error::PoolTimedOut));
            }
            let accounts = self.accounts.lock().await;
            Ok(accounts.iter().map(|a| a.username.clone()).collect())
        }
    }

    fn service(store: MemoryCredentialStore) -> UserService {
        UserService::new(Arc::new(store), PasswordHasher::new(4))
    }

    #[tokio::test]
    async fn test_signup_then_authenticate() {
        let users = service(MemoryCredentialStore::default());
        users.signup("alice", "p@ss1234", "a@x.com").await.unwrap();

        users.authenticate_user("alice", "p@ss1234").await.unwrap();
        assert_eq!(users.list_usernames().await.unwrap(), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_duplicate_username_checked_before_email() {
        let users = service(MemoryCredentialStore::default());
        users.signup("alice", "p@ss1234", "a@x.com").await.unwrap();
        users.signup("bob", "p@ss1234", "b@x.com").await.unwrap();

        let err = users.signup("alice", "other", "b@x.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateUsername { .. }));

        let err = users.signup("alice", "other", "new@x.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateUsername { .. }));

        let err = users.signup("carol", "other", "a@x.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn test_insert_conflict_maps_to_duplicate() {
        let store = MemoryCredentialStore {
            skip_lookup: true,
            ..Default::default()
        };
        let users = service(store);
        users.signup("alice", "p@ss1234", "a@x.com").await.unwrap();

        let err = users.signup("alice", "x", "z@x.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateUsername { .. }));

        let err = users.signup("zed", "x", "a@x.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
        let users = service(MemoryCredentialStore::default());
        users.signup("alice", "p@ss1234", "a@x.com").await.unwrap();

        let wrong = users.authenticate_user("alice", "wrong").await.unwrap_err();
        let unknown = users.authenticate_user("mallory", "p@ss1234").await.unwrap_err();

        assert!(matches!(wrong, ServiceError::InvalidCredentials));
        assert!(matches!(unknown, ServiceError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_storage_failures_are_internal() {
        let users = service(MemoryCredentialStore {
            fail: true,
            ..Default::default()
        });

        let err = users.signup("alice", "p@ss1234", "a@x.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::InternalError { .. }));

        let err = users.authenticate_user("alice", "p@ss1234").await.unwrap_err();
        assert!(matches!(err, ServiceError::InternalError { .. }));

        let err = users.list_usernames().await.unwrap_err();
        assert!(matches!(err, ServiceError::InternalError { .. }));
    }

    #[tokio::test]
    async fn test_hashing_failure_is_internal() {
        let users = UserService::new(Arc::new(MemoryCredentialStore::default()), PasswordHasher::new(2));

        let err = users.signup("alice", "p@ss1234", "a@x.com").await.unwrap_err();
        assert!(matches!(err, ServiceError::InternalError { .. }));
    }
}
