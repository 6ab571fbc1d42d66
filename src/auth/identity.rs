//! Authenticated identities and per-request role augmentation.

use std::fmt;

use tracing::{debug, warn};

use super::roles::{derive_roles, RoleSet};
use crate::db::AccountStore;

static NO_ROLES: RoleSet = RoleSet::new();

/// The name an identity was authenticated under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    username: String,
}

impl Principal {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

/// The identity a request runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Not logged in.
    Anonymous,
    /// Logged in, with whatever roles were last attached.
    Authenticated { principal: Principal, roles: RoleSet },
}

impl Identity {
    /// An authenticated identity with no roles yet.
    pub fn authenticated(username: impl Into<String>) -> Self {
        Identity::Authenticated {
            principal: Principal::new(username),
            roles: RoleSet::new(),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated { principal, .. } => Some(principal),
        }
    }

    /// Attached roles. Always empty for an anonymous identity.
    pub fn roles(&self) -> &RoleSet {
        match self {
            Identity::Anonymous => &NO_ROLES,
            Identity::Authenticated { roles, .. } => roles,
        }
    }

    /// Check a role token such as `"exercise:add"`.
    pub fn has_role(&self, token: &str) -> bool {
        self.roles().contains_token(token)
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}

/// Attaches rank-derived roles to an authenticated identity.
///
/// Intended to run on every request that needs an authorization decision, so
/// rank changes take effect without a new login.
pub struct IdentityAugmentor<S> {
    store: S,
}

impl<S: AccountStore> IdentityAugmentor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Return `identity` with a freshly derived role set.
    ///
    /// Anonymous identities come back unchanged. For an authenticated one the
    /// incoming roles are always discarded: when the account or its rank
    /// cannot be found, or the store fails, the principal comes back with no
    /// roles at all.
    pub async fn augment(&self, identity: Identity) -> Identity {
        let principal = match identity {
            Identity::Anonymous => return Identity::Anonymous,
            Identity::Authenticated { principal, .. } => principal,
        };

        let roles = self.resolve_roles(&principal).await;
        Identity::Authenticated { principal, roles }
    }

    async fn resolve_roles(&self, principal: &Principal) -> RoleSet {
        let account = match self.store.find_account_by_username(principal.username()).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                debug!(username = %principal, "No account for identity, no roles granted");
                return RoleSet::new();
            }
            Err(e) => {
                warn!(username = %principal, error = %e, "Account lookup failed during augmentation");
                return RoleSet::new();
            }
        };

        let Some(rank_id) = account.rank_id else {
            debug!(username = %principal, "Account has no rank, no roles granted");
            return RoleSet::new();
        };

        match self.store.find_rank_by_id(rank_id).await {
            Ok(Some(rank)) => {
                let roles = derive_roles(Some(&rank));
                debug!(username = %principal, rank = %rank.name, roles = roles.len(), "Roles derived");
                roles
            }
            Ok(None) => {
                warn!(username = %principal, rank_id, "Assigned rank not found");
                RoleSet::new()
            }
            Err(e) => {
                warn!(username = %principal, rank_id, error = %e, "Rank lookup failed during augmentation");
                RoleSet::new()
            }
        }
    }
}
