//! Authorization predicates.
//!
//! A predicate is a pure function of a resolved user record. The set is
//! closed: every guard in the system evaluates one of these variants.

use std::fmt;

use peruser_core::{User, UserIndex};

/// The permission a request must hold to proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The caller's account is enabled.
    Enabled,
    /// The caller's account is enabled and flagged admin.
    Admin,
    /// The caller's account is enabled and either is the record at this
    /// index or is an admin.
    SelfOrAdmin(UserIndex),
}

impl Predicate {
    /// Evaluate against the caller's record.
    ///
    /// `enabled` is checked before anything else in every variant: a disabled
    /// account holds no predicate, whatever its `admin` flag says.
    pub fn holds_for(&self, caller: &User) -> bool {
        if !caller.is_enabled() {
            return false;
        }

        match self {
            Predicate::Enabled => true,
            Predicate::Admin => caller.is_admin(),
            Predicate::SelfOrAdmin(target) => caller.owns(target) || caller.is_admin(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Predicate::Enabled => "enabled",
            Predicate::Admin => "admin",
            Predicate::SelfOrAdmin(_) => "self_or_admin",
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::SelfOrAdmin(target) => write!(f, "self_or_admin({})", target),
            other => f.write_str(other.name()),
        }
    }
}
