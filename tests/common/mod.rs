//! Test helpers for rankgate integration tests.
//!
//! Provides database seeding and a store that fails on demand.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rankgate::auth::{HashingEngine, Permission};
use rankgate::db::{
    Account, AccountRepository, AccountStore, Database, NewAccount, NewRank, Rank, RankRepository,
};
use rankgate::{RankgateError, Result};

/// Hashing engine with minimal cost, so tests stay fast.
pub fn test_engine() -> HashingEngine {
    HashingEngine::new(1024, 1, 1).unwrap()
}

/// Fresh in-memory database with migrations applied.
pub async fn setup_db() -> Database {
    Database::open_in_memory().await.unwrap()
}

/// Create a rank granting `permissions` and return its ID.
pub async fn seed_rank(db: &Database, name: &str, permissions: &[Permission]) -> i64 {
    RankRepository::new(db.pool())
        .create(&NewRank::new(name).grant_all(permissions.iter().copied()))
        .await
        .unwrap()
        .id
}

/// Options for a seeded account.
#[derive(Debug, Clone, Copy)]
pub struct AccountState {
    pub banned: bool,
    pub activated: bool,
    pub rank_id: Option<i64>,
}

impl Default for AccountState {
    fn default() -> Self {
        Self {
            banned: false,
            activated: true,
            rank_id: None,
        }
    }
}

/// Create an account whose password is `password` and return it.
pub async fn seed_account(
    db: &Database,
    username: &str,
    password: &str,
    state: AccountState,
) -> Account {
    let engine = test_engine();
    let salt = engine.generate_salt();
    let hash = engine.hash_password(password, &salt).unwrap();

    let mut new_account = NewAccount::new(username, hash, salt)
        .banned(state.banned)
        .activated(state.activated);
    if let Some(rank_id) = state.rank_id {
        new_account = new_account.with_rank(rank_id);
    }

    AccountRepository::new(db.pool())
        .create(&new_account)
        .await
        .unwrap()
}

/// Store wrapping a real database, with switches to make each operation fail.
pub struct FaultyStore {
    inner: Database,
    pub fail_account_lookup: AtomicBool,
    pub fail_rank_lookup: AtomicBool,
    pub fail_last_login: AtomicBool,
    pub last_login_calls: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: Database) -> Self {
        Self {
            inner,
            fail_account_lookup: AtomicBool::new(false),
            fail_rank_lookup: AtomicBool::new(false),
            fail_last_login: AtomicBool::new(false),
            last_login_calls: AtomicUsize::new(0),
        }
    }
}

fn injected() -> RankgateError {
    RankgateError::Database("injected failure".to_string())
}

#[async_trait]
impl AccountStore for FaultyStore {
    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        if self.fail_account_lookup.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.find_account_by_username(username).await
    }

    async fn find_rank_by_id(&self, rank_id: i64) -> Result<Option<Rank>> {
        if self.fail_rank_lookup.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.find_rank_by_id(rank_id).await
    }

    async fn update_last_login(&self, account_id: i64, at: DateTime<Utc>) -> Result<()> {
        self.last_login_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_last_login.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.update_last_login(account_id, at).await
    }
}
