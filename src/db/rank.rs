//! Rank model for rankgate.
//!
//! A rank is a named permission profile shared by every account assigned to
//! it. Each flag is nullable in storage; only `Some(true)` grants anything.

use std::collections::BTreeSet;

use crate::auth::Permission;

/// Rank entity with its permission matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Rank {
    /// Unique rank ID.
    pub id: i64,
    /// Rank name (unique).
    pub name: String,

    pub admin_view: Option<bool>,

    pub exercise_add: Option<bool>,
    pub exercise_edit: Option<bool>,
    pub exercise_delete: Option<bool>,

    pub lesson_add: Option<bool>,
    pub lesson_edit: Option<bool>,
    pub lesson_delete: Option<bool>,

    pub comment_add: Option<bool>,
    pub comment_edit: Option<bool>,
    pub comment_delete: Option<bool>,

    pub user_add: Option<bool>,
    pub user_edit: Option<bool>,
    pub user_delete: Option<bool>,

    pub user_group_add: Option<bool>,
    pub user_group_edit: Option<bool>,
    pub user_group_delete: Option<bool>,

    pub user_rank_add: Option<bool>,
    pub user_rank_edit: Option<bool>,
    pub user_rank_delete: Option<bool>,
}

/// Data for creating a new rank.
///
/// Permissions not granted are stored as `false`.
#[derive(Debug, Clone)]
pub struct NewRank {
    /// Rank name.
    pub name: String,
    /// Granted permissions.
    pub granted: BTreeSet<Permission>,
}

impl NewRank {
    /// Create a rank that grants nothing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            granted: BTreeSet::new(),
        }
    }

    /// Grant a permission.
    pub fn grant(mut self, permission: Permission) -> Self {
        self.granted.insert(permission);
        self
    }

    /// Grant several permissions.
    pub fn grant_all(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.granted.extend(permissions);
        self
    }

    /// Check whether a permission will be stored as granted.
    pub fn grants(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }
}
