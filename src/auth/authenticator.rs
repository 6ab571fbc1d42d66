//! Credential authentication for rankgate.
//!
//! [`Authenticator`] decides whether a username/password pair may log in.
//! Every outcome is a [`Verification`] value; no error escapes to the caller.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::identity::Identity;
use super::password::{HashingEngine, HASH_LEN};
use crate::db::{Account, AccountStore};

/// Why a login attempt was rejected.
///
/// Unknown usernames and wrong passwords share `InvalidCredentials`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("account is banned")]
    Banned,

    #[error("account is not activated")]
    NotActivated,
}

/// Result of a credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The credentials are valid and the account may log in.
    Authenticated { username: String },
    /// The login was rejected.
    Failed(FailureReason),
}

impl Verification {
    /// Check if the attempt succeeded.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Verification::Authenticated { .. })
    }

    /// The rejection reason, if any.
    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            Verification::Authenticated { .. } => None,
            Verification::Failed(reason) => Some(*reason),
        }
    }

    /// Convert into a bare identity with no roles attached.
    ///
    /// A failed verification yields [`Identity::Anonymous`].
    pub fn into_identity(self) -> Identity {
        match self {
            Verification::Authenticated { username } => Identity::authenticated(username),
            Verification::Failed(_) => Identity::Anonymous,
        }
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verification::Authenticated { username } => write!(f, "authenticated as {username}"),
            Verification::Failed(reason) => write!(f, "{reason}"),
        }
    }
}

/// Verifies credentials against an [`AccountStore`].
///
/// Holds no per-request state and can be shared across tasks.
pub struct Authenticator<S> {
    store: S,
    engine: HashingEngine,
    decoy_salt: String,
    decoy_hash: String,
    #[cfg(test)]
    hash_runs: std::sync::atomic::AtomicUsize,
}

impl<S: AccountStore> Authenticator<S> {
    /// Create an authenticator over the given store and hashing engine.
    pub fn new(store: S, engine: HashingEngine) -> Self {
        let decoy_salt = engine.generate_salt();
        let decoy_hash = STANDARD.encode([0u8; HASH_LEN]);
        Self {
            store,
            engine,
            decoy_salt,
            decoy_hash,
            #[cfg(test)]
            hash_runs: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check a username/password pair.
    ///
    /// The password is checked first, then the banned flag, then activation.
    /// A successful login stamps `last_login_at`; failure to do so is logged
    /// and does not change the verdict.
    pub async fn authenticate(&self, username: &str, password: &str) -> Verification {
        if username.trim().is_empty() || password.trim().is_empty() {
            debug!("Rejecting blank credentials");
            return Verification::Failed(FailureReason::InvalidCredentials);
        }

        let account = match self.store.find_account_by_username(username).await {
            Ok(account) => account,
            Err(e) => {
                warn!(username = %username, error = %e, "Account lookup failed");
                None
            }
        };

        let Some(account) = account else {
            self.run_decoy(password).await;
            info!(username = %username, "Login rejected: invalid credentials");
            return Verification::Failed(FailureReason::InvalidCredentials);
        };

        let verified = match credentials(&account) {
            Some((hash, salt)) => self.verify(password, hash, salt).await,
            None => {
                warn!(username = %username, "Account has no stored credentials");
                self.run_decoy(password).await;
                false
            }
        };

        if !verified {
            info!(username = %username, "Login rejected: invalid credentials");
            return Verification::Failed(FailureReason::InvalidCredentials);
        }

        if account.banned {
            info!(username = %username, "Login rejected: account banned");
            return Verification::Failed(FailureReason::Banned);
        }
        if !account.activated {
            info!(username = %username, "Login rejected: account not activated");
            return Verification::Failed(FailureReason::NotActivated);
        }

        if let Err(e) = self.store.update_last_login(account.id, Utc::now()).await {
            warn!(username = %username, error = %e, "Failed to record last login");
        }

        info!(username = %username, "Login succeeded");
        Verification::Authenticated {
            username: account.username,
        }
    }

    /// Run Argon2 on the blocking pool. A panicked or cancelled task counts
    /// as a mismatch.
    async fn verify(&self, password: &str, hash: &str, salt: &str) -> bool {
        #[cfg(test)]
        self.hash_runs
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let engine = self.engine.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        let salt = salt.to_owned();

        tokio::task::spawn_blocking(move || {
            engine.verify_password(
                Some(password.as_str()),
                Some(hash.as_str()),
                Some(salt.as_str()),
            )
        })
        .await
        .unwrap_or(false)
    }

    /// Spend the same Argon2 work as a real check. The result is discarded.
    async fn run_decoy(&self, password: &str) {
        let _ = self.verify(password, &self.decoy_hash, &self.decoy_salt).await;
    }
}

/// The stored hash and salt, if both are present and non-empty.
fn credentials(account: &Account) -> Option<(&str, &str)> {
    let hash = account.password_hash.as_deref().filter(|h| !h.is_empty())?;
    let salt = account.salt.as_deref().filter(|s| !s.is_empty())?;
    Some((hash, salt))
}
