//! Authentication module for rankgate.
//!
//! This module provides password hashing, credential verification, rank to
//! role derivation, and per-request identity augmentation.

mod authenticator;
mod identity;
mod password;
mod roles;

pub use authenticator::{Authenticator, FailureReason, Verification};
pub use identity::{Identity, IdentityAugmentor, Principal};
pub use password::{HashingEngine, HashingError, HASH_LEN, SALT_LEN};
pub use roles::{derive_roles, Permission, RoleSet, PERMISSION_COUNT};
