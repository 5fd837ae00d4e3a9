//! The user directory: permission queries over the record store.
//!
//! The directory answers yes or no. Every failure to resolve a caller, from
//! an unknown key to a store outage, is a no. Nothing is cached: each query
//! performs a fresh lookup, so a revoked key or disabled account takes effect
//! on the next request.

use std::sync::Arc;

use async_trait::async_trait;
use peruser_core::{fingerprint, UserIndex};
use peruser_store::{RecordStore, StoreError};

use crate::predicate::Predicate;

/// Boolean permission queries keyed by API key.
///
/// Implementations never return errors. Two implementations exist, selected
/// once at startup: [`StoreDirectory`] for real deployments and
/// [`BypassDirectory`] for local development.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolve the caller once and evaluate `predicate` against that record.
    async fn evaluate(&self, api_key: &str, predicate: &Predicate) -> bool;

    /// A record with this key exists and is enabled.
    async fn is_enabled(&self, api_key: &str) -> bool {
        self.evaluate(api_key, &Predicate::Enabled).await
    }

    /// A record with this key exists, is enabled, and is admin.
    async fn is_admin(&self, api_key: &str) -> bool {
        self.evaluate(api_key, &Predicate::Admin).await
    }

    /// The key resolves to an enabled record that either has `index` or is admin.
    async fn has_index_or_is_admin(&self, api_key: &str, index: &UserIndex) -> bool {
        self.evaluate(api_key, &Predicate::SelfOrAdmin(index.clone()))
            .await
    }
}

/// Directory backed by the record store.
pub struct StoreDirectory<S: ?Sized> {
    store: Arc<S>,
}

impl<S: RecordStore + ?Sized> StoreDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: RecordStore + ?Sized> Directory for StoreDirectory<S> {
    async fn evaluate(&self, api_key: &str, predicate: &Predicate) -> bool {
        // A missing credential never reaches the store.
        if api_key.is_empty() {
            return false;
        }

        match self.store.read_by_key(api_key).await {
            Ok(caller) => predicate.holds_for(&caller),
            Err(StoreError::NotFound(_)) => false,
            Err(e) => {
                tracing::warn!(
                    key = %fingerprint(api_key),
                    %predicate,
                    error = %e,
                    "store lookup failed during authorization, denying"
                );
                false
            }
        }
    }
}

/// Directory that grants every predicate without touching the store.
///
/// For local development only. It is chosen by startup configuration; no
/// request input can select or reach it.
#[derive(Debug, Default, Clone, Copy)]
pub struct BypassDirectory;

#[async_trait]
impl Directory for BypassDirectory {
    async fn evaluate(&self, _api_key: &str, predicate: &Predicate) -> bool {
        tracing::trace!(%predicate, "authorization bypassed");
        true
    }
}
