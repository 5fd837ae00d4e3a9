//! RecordStore trait: the abstract interface for user record persistence.
//!
//! The authorization and exposure layers are storage-agnostic. Implementations
//! include SQLite (persistent) and in-memory (tests, ephemeral deployments).

use async_trait::async_trait;
use peruser_core::{NewUser, User, UserIndex, UserUpdate};

use crate::error::{Result, StoreError};

/// The RecordStore trait: async CRUD over user records.
///
/// Every method resolves exactly once to a value or a typed [`StoreError`].
/// Implementations must tolerate overlapping reads and writes; callers add no
/// locking of their own.
///
/// # Design Notes
///
/// - **Two identifiers**: records are addressed by [`UserIndex`] for CRUD and
///   looked up by API key for authentication. Both are unique.
/// - **Not found is an error**: a missing record is `StoreError::NotFound`,
///   never an empty success.
/// - **Schema**: `create` and `update_by_index` validate fields and return
///   `StoreError::Validation` before touching storage.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a record.
    ///
    /// Assigns the next free sequential index when `user.index` is absent and
    /// generates a key when `user.key` is absent. Returns `Conflict` if the
    /// index or key is already taken.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Look up a record by its API key.
    async fn read_by_key(&self, key: &str) -> Result<User>;

    /// Look up a record by its index.
    async fn read_by_index(&self, index: &UserIndex) -> Result<User>;

    /// All records, in creation order.
    async fn read_all(&self) -> Result<Vec<User>>;

    /// Apply a partial update to the record at `index` and return the result.
    async fn update_by_index(&self, index: &UserIndex, update: UserUpdate) -> Result<User>;

    /// Remove the record at `index`.
    async fn delete_by_index(&self, index: &UserIndex) -> Result<()>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: RecordStore {
    /// Create `user` unless a record with its index already exists.
    ///
    /// Returns the stored record either way. A record created concurrently
    /// between the lookup and the insert is returned as existing.
    fn ensure_user(
        &self,
        user: NewUser,
    ) -> impl std::future::Future<Output = Result<User>> + Send;
}

impl<S: RecordStore + ?Sized> StoreExt for S {
    async fn ensure_user(&self, user: NewUser) -> Result<User> {
        let Some(index) = user.index.clone() else {
            return self.create(user).await;
        };

        match self.read_by_index(&index).await {
            Ok(existing) => return Ok(existing),
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        match self.create(user).await {
            Err(StoreError::Conflict(_)) => self.read_by_index(&index).await,
            other => other,
        }
    }
}

/// Pick the first sequential index, starting at `start`, that is not `taken`.
pub(crate) fn next_free_index(
    start: u64,
    mut taken: impl FnMut(&UserIndex) -> Result<bool>,
) -> Result<(u64, UserIndex)> {
    let mut n = start.max(1);
    loop {
        let candidate = UserIndex::new(n.to_string());
        if !taken(&candidate)? {
            return Ok((n, candidate));
        }
        n += 1;
    }
}
