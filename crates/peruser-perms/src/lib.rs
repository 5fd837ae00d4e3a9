//! # Peruser Permissions
//!
//! The authorization decision engine: who may run which operation.
//!
//! ## Overview
//!
//! A request carries an API key. The [`Gate`] hands the key and a
//! [`Predicate`] to a [`Directory`], which resolves the key to at most one
//! user record and evaluates the predicate against it. The answer is a
//! [`Decision`]; errors never cross this boundary.
//!
//! ## Key Concepts
//!
//! - **Enabled before admin**: a disabled account holds no predicate, whatever
//!   its `admin` flag says.
//! - **Self or admin**: a user may act on their own record; only admins may
//!   act on others'.
//! - **Fail closed**: unknown keys, missing keys and store failures all deny.
//! - **Bypass**: [`BypassDirectory`] grants everything. It is a separate type
//!   chosen at startup, not a flag inside [`StoreDirectory`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use peruser_perms::{Gate, Predicate, StoreDirectory};
//! use peruser_store::MemoryStore;
//!
//! async fn example(api_key: Option<&str>) {
//!     let store = Arc::new(MemoryStore::new());
//!     let gate = Gate::new(Arc::new(StoreDirectory::new(store)));
//!
//!     let decision = gate.check(api_key, &Predicate::Admin).await;
//!     if !decision.is_allowed() {
//!         // respond 403
//!     }
//! }
//! ```

pub mod directory;
pub mod gate;
pub mod predicate;

pub use directory::{BypassDirectory, Directory, StoreDirectory};
pub use gate::{Decision, Gate};
pub use predicate::Predicate;
