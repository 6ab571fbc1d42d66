//! Store abstraction consumed by the authentication core.
//!
//! The authenticator and the identity augmentor only need three operations,
//! so they depend on this trait rather than on a concrete database. Tests
//! substitute fakes; production uses [`Database`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::repository::{AccountRepository, RankRepository};
use super::{Account, Database, Rank};
use crate::Result;

/// Read-mostly access to accounts and ranks.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by exact username.
    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Look up a rank by ID.
    async fn find_rank_by_id(&self, rank_id: i64) -> Result<Option<Rank>>;

    /// Record the time of a successful login.
    async fn update_last_login(&self, account_id: i64, at: DateTime<Utc>) -> Result<()>;
}

#[async_trait]
impl AccountStore for Database {
    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        AccountRepository::new(self.pool())
            .get_by_username(username)
            .await
    }

    async fn find_rank_by_id(&self, rank_id: i64) -> Result<Option<Rank>> {
        RankRepository::new(self.pool()).get_by_id(rank_id).await
    }

    async fn update_last_login(&self, account_id: i64, at: DateTime<Utc>) -> Result<()> {
        AccountRepository::new(self.pool())
            .update_last_login(account_id, at)
            .await
    }
}

#[async_trait]
impl<T: AccountStore + ?Sized> AccountStore for Arc<T> {
    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        (**self).find_account_by_username(username).await
    }

    async fn find_rank_by_id(&self, rank_id: i64) -> Result<Option<Rank>> {
        (**self).find_rank_by_id(rank_id).await
    }

    async fn update_last_login(&self, account_id: i64, at: DateTime<Utc>) -> Result<()> {
        (**self).update_last_login(account_id, at).await
    }
}
