//! Account and rank repositories for rankgate.
//!
//! These provide the provisioning and maintenance operations used by tooling
//! and tests. The authentication core itself only reads through
//! [`AccountStore`](super::AccountStore).

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::account::{Account, NewAccount};
use super::rank::{NewRank, Rank};
use crate::auth::Permission;
use crate::{RankgateError, Result};

const ACCOUNT_COLUMNS: &str = "id, username, password_hash, salt, rank_id, banned, activated,
     created_at, last_login_at";

const RANK_COLUMNS: &str = "id, name, admin_view,
     exercise_add, exercise_edit, exercise_delete,
     lesson_add, lesson_edit, lesson_delete,
     comment_add, comment_edit, comment_delete,
     user_add, user_edit, user_delete,
     user_group_add, user_group_edit, user_group_delete,
     user_rank_add, user_rank_edit, user_rank_delete";

/// Repository for account operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new AccountRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Provision a new account.
    ///
    /// Returns the created account with the assigned ID.
    pub async fn create(&self, new_account: &NewAccount) -> Result<Account> {
        if new_account.username.is_empty() {
            return Err(RankgateError::Validation(
                "username must not be empty".to_string(),
            ));
        }

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, salt, rank_id, banned, activated)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_account.username)
        .bind(&new_account.password_hash)
        .bind(&new_account.salt)
        .bind(new_account.rank_id)
        .bind(new_account.banned)
        .bind(new_account.activated)
        .execute(self.pool)
        .await
        .map_err(|e| RankgateError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| RankgateError::NotFound("account".to_string()))
    }

    /// Get an account by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = ?");
        let result = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RankgateError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get an account by username.
    ///
    /// The comparison is exact: `Alice` and `alice` are different accounts.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE username = ?");
        let result = sqlx::query_as::<_, Account>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RankgateError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Record a successful login.
    pub async fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RankgateError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RankgateError::NotFound("account".to_string()));
        }
        Ok(())
    }

    /// Assign (or clear) the rank of an account.
    ///
    /// Returns `false` if the account does not exist.
    pub async fn assign_rank(&self, id: i64, rank_id: Option<i64>) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET rank_id = ? WHERE id = ?")
            .bind(rank_id)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RankgateError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for rank operations.
pub struct RankRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RankRepository<'a> {
    /// Create a new RankRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new rank. Every permission not granted is stored as `false`.
    pub async fn create(&self, new_rank: &NewRank) -> Result<Rank> {
        if new_rank.name.is_empty() {
            return Err(RankgateError::Validation(
                "rank name must not be empty".to_string(),
            ));
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("INSERT INTO user_ranks (name");
        for permission in Permission::ALL {
            builder.push(", ");
            builder.push(permission.column());
        }
        builder.push(") VALUES (");
        {
            let mut values = builder.separated(", ");
            values.push_bind(new_rank.name.clone());
            for permission in Permission::ALL {
                values.push_bind(new_rank.grants(permission));
            }
        }
        builder.push(")");

        let result = builder
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| RankgateError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| RankgateError::NotFound("rank".to_string()))
    }

    /// Get a rank by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Rank>> {
        let sql = format!("SELECT {RANK_COLUMNS} FROM user_ranks WHERE id = ?");
        let result = sqlx::query_as::<_, Rank>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RankgateError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a rank by name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Rank>> {
        let sql = format!("SELECT {RANK_COLUMNS} FROM user_ranks WHERE name = ?");
        let result = sqlx::query_as::<_, Rank>(&sql)
            .bind(name)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RankgateError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Set a single permission flag. `None` stores NULL, which grants nothing.
    ///
    /// Returns `false` if the rank does not exist.
    pub async fn set_permission(
        &self,
        id: i64,
        permission: Permission,
        value: Option<bool>,
    ) -> Result<bool> {
        // Column names come from the closed Permission enum, never from input.
        let sql = format!(
            "UPDATE user_ranks SET {} = ? WHERE id = ?",
            permission.column()
        );
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RankgateError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_account() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        let account = repo
            .create(&NewAccount::new("alice", "hash", "salt"))
            .await
            .unwrap();

        assert_eq!(account.id, 1);
        assert_eq!(account.username, "alice");
        assert_eq!(account.password_hash.as_deref(), Some("hash"));
        assert_eq!(account.salt.as_deref(), Some("salt"));
        assert_eq!(account.rank_id, None);
        assert!(!account.banned);
        assert!(!account.activated);
        assert!(account.last_login_at.is_none());
        assert!(!account.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_create_account_empty_username() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        let result = repo.create(&NewAccount::new("", "hash", "salt")).await;
        assert!(matches!(result, Err(RankgateError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_account_duplicate_username() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        repo.create(&NewAccount::new("alice", "hash", "salt"))
            .await
            .unwrap();
        let result = repo.create(&NewAccount::new("alice", "other", "salt")).await;

        assert!(matches!(result, Err(RankgateError::Database(_))));
    }

    #[tokio::test]
    async fn test_create_account_unknown_rank_rejected() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        let result = repo
            .create(&NewAccount::new("alice", "hash", "salt").with_rank(42))
            .await;

        assert!(matches!(result, Err(RankgateError::Database(_))));
    }

    #[tokio::test]
    async fn test_get_by_username_is_exact() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        repo.create(&NewAccount::new("alice", "hash", "salt"))
            .await
            .unwrap();

        assert!(repo.get_by_username("alice").await.unwrap().is_some());
        assert!(repo.get_by_username("Alice").await.unwrap().is_none());
        assert!(repo.get_by_username("alice ").await.unwrap().is_none());
        assert!(repo.get_by_username("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_last_login() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        let account = repo
            .create(&NewAccount::new("alice", "hash", "salt"))
            .await
            .unwrap();
        let now = Utc::now();
        repo.update_last_login(account.id, now).await.unwrap();

        let stored = repo.get_by_id(account.id).await.unwrap().unwrap();
        let last = stored.last_login_at.unwrap();
        assert_eq!(last.timestamp(), now.timestamp());
    }

    #[tokio::test]
    async fn test_update_last_login_missing_account() {
        let db = setup_db().await;
        let repo = AccountRepository::new(db.pool());

        let result = repo.update_last_login(999, Utc::now()).await;
        assert!(matches!(result, Err(RankgateError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_assign_rank() {
        let db = setup_db().await;
        let accounts = AccountRepository::new(db.pool());
        let ranks = RankRepository::new(db.pool());

        let rank = ranks.create(&NewRank::new("Editor")).await.unwrap();
        let account = accounts
            .create(&NewAccount::new("alice", "hash", "salt"))
            .await
            .unwrap();

        assert!(accounts.assign_rank(account.id, Some(rank.id)).await.unwrap());
        let stored = accounts.get_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.rank_id, Some(rank.id));

        assert!(accounts.assign_rank(account.id, None).await.unwrap());
        let stored = accounts.get_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.rank_id, None);

        assert!(!accounts.assign_rank(999, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_rank_stores_grants() {
        let db = setup_db().await;
        let repo = RankRepository::new(db.pool());

        let rank = repo
            .create(
                &NewRank::new("Editor")
                    .grant(Permission::ExerciseAdd)
                    .grant(Permission::UserGroupDelete),
            )
            .await
            .unwrap();

        assert_eq!(rank.name, "Editor");
        assert_eq!(rank.exercise_add, Some(true));
        assert_eq!(rank.user_group_delete, Some(true));
        assert_eq!(rank.admin_view, Some(false));
        assert_eq!(rank.exercise_edit, Some(false));
    }

    #[tokio::test]
    async fn test_create_rank_duplicate_name() {
        let db = setup_db().await;
        let repo = RankRepository::new(db.pool());

        repo.create(&NewRank::new("Editor")).await.unwrap();
        let result = repo.create(&NewRank::new("Editor")).await;

        assert!(matches!(result, Err(RankgateError::Database(_))));
    }

    #[tokio::test]
    async fn test_create_rank_empty_name() {
        let db = setup_db().await;
        let repo = RankRepository::new(db.pool());

        let result = repo.create(&NewRank::new("")).await;
        assert!(matches!(result, Err(RankgateError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_rank_by_name() {
        let db = setup_db().await;
        let repo = RankRepository::new(db.pool());

        let created = repo.create(&NewRank::new("Viewer")).await.unwrap();

        let found = repo.get_by_name("Viewer").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(repo.get_by_name("viewer").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_permission() {
        let db = setup_db().await;
        let repo = RankRepository::new(db.pool());

        let rank = repo.create(&NewRank::new("Editor")).await.unwrap();

        assert!(repo
            .set_permission(rank.id, Permission::LessonEdit, Some(true))
            .await
            .unwrap());
        assert!(repo
            .set_permission(rank.id, Permission::AdminView, None)
            .await
            .unwrap());

        let stored = repo.get_by_id(rank.id).await.unwrap().unwrap();
        assert_eq!(stored.lesson_edit, Some(true));
        assert_eq!(stored.admin_view, None);

        assert!(!repo
            .set_permission(999, Permission::LessonEdit, Some(true))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_every_permission_column_exists() {
        let db = setup_db().await;
        let repo = RankRepository::new(db.pool());

        let rank = repo
            .create(&NewRank::new("All").grant_all(Permission::ALL))
            .await
            .unwrap();

        for permission in Permission::ALL {
            assert!(repo
                .set_permission(rank.id, permission, Some(false))
                .await
                .unwrap());
        }
    }
}
