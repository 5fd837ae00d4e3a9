//! The guard executor.
//!
//! Every guard in the request pipeline is this one executor run with a
//! different [`Predicate`]. It resolves exactly once per call, to
//! [`Decision::Allow`] or [`Decision::Deny`].

use std::sync::Arc;

use peruser_core::fingerprint;

use crate::directory::Directory;
use crate::predicate::Predicate;

/// Outcome of a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Runs predicates against the caller's credential via a [`Directory`].
#[derive(Clone)]
pub struct Gate {
    directory: Arc<dyn Directory>,
}

impl Gate {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Decide whether the holder of `api_key` satisfies `predicate`.
    ///
    /// An absent credential is passed to the directory as the empty string,
    /// so the directory variant alone decides what a missing key means.
    pub async fn check(&self, api_key: Option<&str>, predicate: &Predicate) -> Decision {
        let api_key = api_key.unwrap_or_default();
        let decision = Decision::from(self.directory.evaluate(api_key, predicate).await);

        tracing::debug!(
            key = %fingerprint(api_key),
            %predicate,
            ?decision,
            "guard evaluated"
        );

        decision
    }
}
