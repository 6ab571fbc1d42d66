//! Account model for rankgate.

use chrono::{DateTime, Utc};

/// Account entity representing a provisioned login identity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    /// Unique account ID.
    pub id: i64,
    /// Login username (unique, compared exactly).
    pub username: String,
    /// Argon2id hash of the password, base64.
    pub password_hash: Option<String>,
    /// Per-account salt, base64.
    pub salt: Option<String>,
    /// Assigned rank, if any.
    pub rank_id: Option<i64>,
    /// Whether the account is banned.
    pub banned: bool,
    /// Whether the account has been activated.
    pub activated: bool,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last successful login (best-effort).
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Data for provisioning a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Login username.
    pub username: String,
    /// Pre-computed password hash.
    pub password_hash: String,
    /// Salt the hash was derived with.
    pub salt: String,
    /// Assigned rank (defaults to none).
    pub rank_id: Option<i64>,
    /// Banned flag (defaults to false).
    pub banned: bool,
    /// Activated flag (defaults to false).
    pub activated: bool,
}

impl NewAccount {
    /// Create a new, not yet activated account without a rank.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        salt: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            salt: salt.into(),
            rank_id: None,
            banned: false,
            activated: false,
        }
    }

    /// Set the rank.
    pub fn with_rank(mut self, rank_id: i64) -> Self {
        self.rank_id = Some(rank_id);
        self
    }

    /// Set the banned flag.
    pub fn banned(mut self, banned: bool) -> Self {
        self.banned = banned;
        self
    }

    /// Set the activated flag.
    pub fn activated(mut self, activated: bool) -> Self {
        self.activated = activated;
        self
    }
}
