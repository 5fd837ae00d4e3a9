//! # Peruser
//!
//! An API-key authorization gate in front of CRUD over user records.
//!
//! ## Overview
//!
//! Every request carries its credential in the `X-API-Key` header. Each
//! route has exactly one guard; the guard resolves the key to a user record
//! and checks one predicate before the handler runs. A denied request ends
//! with a bare 403 and never reaches the store operation.
//!
//! | Route | Guard |
//! |---|---|
//! | `POST /users` | enabled admin |
//! | `GET /users` | enabled admin |
//! | `GET /user/{index}` | enabled owner of `{index}`, or enabled admin |
//! | `PUT /user/{index}` | enabled admin |
//! | `DELETE /user/{index}` | enabled admin |
//! | `GET /service` | any enabled user |
//!
//! Unmatched requests are denied, except `OPTIONS` preflight, which gets an
//! empty 204.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use peruser::{Server, ServerConfig};
//!
//! async fn example() {
//!     let config = ServerConfig::load("peruser.toml").unwrap();
//!     let server = Server::build(config).await.unwrap();
//!     server.run().await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `peruser::core` - Record types and field rules
//! - `peruser::store` - Record store trait, SQLite and in-memory backends
//! - `peruser::perms` - Predicates, directories and the gate

pub mod config;
pub mod error;
pub mod guard;
pub mod routes;
pub mod server;
pub mod state;

// Re-export component crates
pub use peruser_core as core;
pub use peruser_perms as perms;
pub use peruser_store as store;

pub use config::{BootstrapAdmin, ServerConfig, ServiceDescriptor, StoreConfig};
pub use error::{ApiError, ServerError};
pub use guard::API_KEY_HEADER;
pub use routes::router;
pub use server::Server;
pub use state::AppState;
