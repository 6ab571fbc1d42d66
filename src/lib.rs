//! rankgate - credential verification and rank-based roles
//!
//! Verifies username/password pairs against salted Argon2id hashes and turns
//! an account's rank into a set of `"resource:action"` roles.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;

pub use auth::{
    derive_roles, Authenticator, FailureReason, HashingEngine, Identity, IdentityAugmentor,
    Permission, Principal, RoleSet, Verification,
};
pub use config::Config;
pub use db::{
    Account, AccountRepository, AccountStore, Database, NewAccount, NewRank, Rank, RankRepository,
};
pub use error::{RankgateError, Result};
