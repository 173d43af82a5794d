//! Pure account-mutation policy
//!
//! `decide` is a pure function over the actor, the target and a snapshot of
//! the enabled-admin count. It performs no I/O, which keeps every rule
//! directly unit-testable; callers are responsible for re-checking the
//! last-admin guard inside the store write (see `AccountStore::disable_account`).

use crate::accountdb::Account;

/// Mutating account operation submitted for a policy decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    Disable,
    Delete,
}

/// Outcome of a policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The target is the only enabled admin in the system
    LastEnabledAdmin,
    /// The actor may not mutate this target
    NotPermitted,
    /// Account deletion is not a supported operation
    DeletionUnsupported,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastEnabledAdmin => write!(f, "cannot disable the only enabled admin"),
            Self::NotPermitted => write!(f, "actor is not permitted to mutate this account"),
            Self::DeletionUnsupported => write!(f, "account deletion is not supported"),
        }
    }
}

/// Decide whether `actor` may perform `action` on `target`
///
/// `enabled_admins` is the current count of accounts with both `is_admin`
/// and `enabled` set, taken from the account store at evaluation time.
///
/// Rule precedence for Disable:
/// 1. last-admin guard (target is the only enabled admin, any actor)
/// 2. self-service (actor disables their own account)
/// 3. admin override (admin actor disables any other account)
/// 4. everything else is denied
pub fn decide(
    actor: &Account,
    target: &Account,
    action: AccountAction,
    enabled_admins: i64,
) -> Decision {
    match action {
        AccountAction::Delete => Decision::Deny(DenyReason::DeletionUnsupported),
        AccountAction::Disable => {
            if target.is_enabled_admin() && enabled_admins <= 1 {
                return Decision::Deny(DenyReason::LastEnabledAdmin);
            }
            if actor.id == target.id || actor.is_admin {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotPermitted)
            }
        }
    }
}

/// Resolve the admin flag for a registration request
///
/// The submitted flag is honored only while the system has no enabled
/// admin; otherwise it is silently ignored. An omitted flag is always
/// non-admin.
pub fn registration_admin_flag(requested: Option<bool>, enabled_admins: i64) -> bool {
    requested.unwrap_or(false) && enabled_admins == 0
}
