//! # Peruser Store
//!
//! The record store behind the authorization gate. Provides a trait-based
//! interface for user record persistence with SQLite and in-memory
//! implementations.
//!
//! ## Key Types
//!
//! - [`RecordStore`] - The async trait for all CRUD operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage
//! - [`StoreError`] - Typed failures: not found, conflict, validation, backend
//!
//! ## Usage
//!
//! ```rust,no_run
//! use peruser_core::NewUser;
//! use peruser_store::{RecordStore, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("peruser.db").unwrap();
//!     let user = store.create(NewUser::new("alice").index("alice")).await.unwrap();
//!     let same = store.read_by_key(user.key.as_str()).await.unwrap();
//!     assert_eq!(user, same);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Typed failures**: a missing record is `NotFound`, a duplicate index or
//!   key is `Conflict`, a schema violation is `Validation`.
//! - **Store-assigned identifiers**: omitted indexes get the next free
//!   sequential number, omitted keys a fresh random key.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{RecordStore, StoreExt};

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
