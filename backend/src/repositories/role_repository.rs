//! Database repository for role assignments.
//!
//! Provides read-only access to the `user_role` table. Assignments are
//! administered elsewhere; this service only resolves the active ones.
use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::errors::StoreError;

/// Read capability over role assignments.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    /// Role identifiers of the active assignments for `username`, in storage order.
    async fn get_active_roles(&self, username: &str) -> Result<Vec<i64>, StoreError>;
}

/// Repository for role assignment database operations.
#[derive(Clone)]
pub struct RoleRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl RoleRepository {
    /// Creates a new RoleRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleResolver for RoleRepository {
    async fn get_active_roles(&self, username: &str) -> Result<Vec<i64>, StoreError> {
        let role_ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT role_id
            FROM user_role
            WHERE username = ? AND is_active = 1
            ORDER BY id
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(role_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    async fn seed(pool: &SqlitePool, username: &str, role_id: i64, active: bool) {
        sqlx::query("INSERT INTO user_role (username, role_id, is_active) VALUES (?, ?, ?)")
            .bind(username)
            .bind(role_id)
            .bind(active)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_only_active_roles_in_storage_order() {
        let db = Database::in_memory().await.unwrap();
        seed(db.pool(), "alice", 3, true).await;
        seed(db.pool(), "alice", 1, false).await;
        seed(db.pool(), "bob", 2, true).await;
        seed(db.pool(), "alice", 2, true).await;

        let repo = RoleRepository::new(db.pool().clone());
        assert_eq!(repo.get_active_roles("alice").await.unwrap(), vec![3, 2]);
        assert_eq!(repo.get_active_roles("bob").await.unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_roles() {
        let db = Database::in_memory().await.unwrap();
        let repo = RoleRepository::new(db.pool().clone());

        assert!(repo.get_active_roles("nobody").await.unwrap().is_empty());
    }
}
