//! Rank-to-role derivation for rankgate.
//!
//! A rank's boolean permission matrix is flattened into a [`RoleSet`] of
//! `"<resource>:<action>"` tokens. Every flag is independent: there is no
//! hierarchy and no wildcard.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::db::Rank;

/// Number of permission flags on a rank.
pub const PERMISSION_COUNT: usize = 19;

/// A single grantable permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "admin:view")]
    AdminView,
    #[serde(rename = "exercise:add")]
    ExerciseAdd,
    #[serde(rename = "exercise:edit")]
    ExerciseEdit,
    #[serde(rename = "exercise:delete")]
    ExerciseDelete,
    #[serde(rename = "lesson:add")]
    LessonAdd,
    #[serde(rename = "lesson:edit")]
    LessonEdit,
    #[serde(rename = "lesson:delete")]
    LessonDelete,
    #[serde(rename = "comment:add")]
    CommentAdd,
    #[serde(rename = "comment:edit")]
    CommentEdit,
    #[serde(rename = "comment:delete")]
    CommentDelete,
    #[serde(rename = "user:add")]
    UserAdd,
    #[serde(rename = "user:edit")]
    UserEdit,
    #[serde(rename = "user:delete")]
    UserDelete,
    #[serde(rename = "user-group:add")]
    UserGroupAdd,
    #[serde(rename = "user-group:edit")]
    UserGroupEdit,
    #[serde(rename = "user-group:delete")]
    UserGroupDelete,
    #[serde(rename = "user-rank:add")]
    UserRankAdd,
    #[serde(rename = "user-rank:edit")]
    UserRankEdit,
    #[serde(rename = "user-rank:delete")]
    UserRankDelete,
}

impl Permission {
    /// Every permission, in token order.
    pub const ALL: [Permission; PERMISSION_COUNT] = [
        Permission::AdminView,
        Permission::ExerciseAdd,
        Permission::ExerciseEdit,
        Permission::ExerciseDelete,
        Permission::LessonAdd,
        Permission::LessonEdit,
        Permission::LessonDelete,
        Permission::CommentAdd,
        Permission::CommentEdit,
        Permission::CommentDelete,
        Permission::UserAdd,
        Permission::UserEdit,
        Permission::UserDelete,
        Permission::UserGroupAdd,
        Permission::UserGroupEdit,
        Permission::UserGroupDelete,
        Permission::UserRankAdd,
        Permission::UserRankEdit,
        Permission::UserRankDelete,
    ];

    /// The role token checked by authorization gates.
    ///
    /// The format is stable; callers compare it with string equality.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::AdminView => "admin:view",
            Permission::ExerciseAdd => "exercise:add",
            Permission::ExerciseEdit => "exercise:edit",
            Permission::ExerciseDelete => "exercise:delete",
            Permission::LessonAdd => "lesson:add",
            Permission::LessonEdit => "lesson:edit",
            Permission::LessonDelete => "lesson:delete",
            Permission::CommentAdd => "comment:add",
            Permission::CommentEdit => "comment:edit",
            Permission::CommentDelete => "comment:delete",
            Permission::UserAdd => "user:add",
            Permission::UserEdit => "user:edit",
            Permission::UserDelete => "user:delete",
            Permission::UserGroupAdd => "user-group:add",
            Permission::UserGroupEdit => "user-group:edit",
            Permission::UserGroupDelete => "user-group:delete",
            Permission::UserRankAdd => "user-rank:add",
            Permission::UserRankEdit => "user-rank:edit",
            Permission::UserRankDelete => "user-rank:delete",
        }
    }

    /// The `user_ranks` column holding this flag.
    pub fn column(&self) -> &'static str {
        match self {
            Permission::AdminView => "admin_view",
            Permission::ExerciseAdd => "exercise_add",
            Permission::ExerciseEdit => "exercise_edit",
            Permission::ExerciseDelete => "exercise_delete",
            Permission::LessonAdd => "lesson_add",
            Permission::LessonEdit => "lesson_edit",
            Permission::LessonDelete => "lesson_delete",
            Permission::CommentAdd => "comment_add",
            Permission::CommentEdit => "comment_edit",
            Permission::CommentDelete => "comment_delete",
            Permission::UserAdd => "user_add",
            Permission::UserEdit => "user_edit",
            Permission::UserDelete => "user_delete",
            Permission::UserGroupAdd => "user_group_add",
            Permission::UserGroupEdit => "user_group_edit",
            Permission::UserGroupDelete => "user_group_delete",
            Permission::UserRankAdd => "user_rank_add",
            Permission::UserRankEdit => "user_rank_edit",
            Permission::UserRankDelete => "user_rank_delete",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    /// Parse a role token. Matching is exact; `"Exercise:Add"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown permission: {s}"))
    }
}

type FlagAccessor = fn(&Rank) -> Option<bool>;

/// Rank flag to permission mapping, walked once per derivation.
static ROLE_TABLE: [(FlagAccessor, Permission); PERMISSION_COUNT] = [
    (|r: &Rank| r.admin_view, Permission::AdminView),
    (|r: &Rank| r.exercise_add, Permission::ExerciseAdd),
    (|r: &Rank| r.exercise_edit, Permission::ExerciseEdit),
    (|r: &Rank| r.exercise_delete, Permission::ExerciseDelete),
    (|r: &Rank| r.lesson_add, Permission::LessonAdd),
    (|r: &Rank| r.lesson_edit, Permission::LessonEdit),
    (|r: &Rank| r.lesson_delete, Permission::LessonDelete),
    (|r: &Rank| r.comment_add, Permission::CommentAdd),
    (|r: &Rank| r.comment_edit, Permission::CommentEdit),
    (|r: &Rank| r.comment_delete, Permission::CommentDelete),
    (|r: &Rank| r.user_add, Permission::UserAdd),
    (|r: &Rank| r.user_edit, Permission::UserEdit),
    (|r: &Rank| r.user_delete, Permission::UserDelete),
    (|r: &Rank| r.user_group_add, Permission::UserGroupAdd),
    (|r: &Rank| r.user_group_edit, Permission::UserGroupEdit),
    (|r: &Rank| r.user_group_delete, Permission::UserGroupDelete),
    (|r: &Rank| r.user_rank_add, Permission::UserRankAdd),
    (|r: &Rank| r.user_rank_edit, Permission::UserRankEdit),
    (|r: &Rank| r.user_rank_delete, Permission::UserRankDelete),
];

/// Set of permission roles attached to an identity.
///
/// Serializes as a sorted list of role tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Permission>);

impl RoleSet {
    /// Create an empty role set.
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check for a permission.
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Check for a role token by exact string match.
    pub fn contains_token(&self, token: &str) -> bool {
        token
            .parse::<Permission>()
            .map(|p| self.contains(p))
            .unwrap_or(false)
    }

    /// Iterate the permissions in token order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Iterate the role tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(Permission::as_str)
    }
}

impl FromIterator<Permission> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Derive the role set granted by a rank.
///
/// An absent rank grants nothing. A flag contributes its role only when it
/// is exactly `Some(true)`.
///
/// # Examples
///
/// ```
/// use rankgate::auth::derive_roles;
/// use rankgate::db::Rank;
///
/// let rank = Rank {
///     exercise_add: Some(true),
///     exercise_delete: Some(false),
///     ..Rank::default()
/// };
///
/// let roles = derive_roles(Some(&rank));
/// assert_eq!(roles.tokens().collect::<Vec<_>>(), vec!["exercise:add"]);
/// assert!(derive_roles(None).is_empty());
/// ```
pub fn derive_roles(rank: Option<&Rank>) -> RoleSet {
    let Some(rank) = rank else {
        return RoleSet::new();
    };

    ROLE_TABLE
        .iter()
        .filter(|(flag, _)| flag(rank) == Some(true))
        .map(|(_, permission)| *permission)
        .collect()
}
