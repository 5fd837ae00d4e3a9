//! # Peruser Core
//!
//! Pure types for Peruser: user records, their two identifiers, and the field
//! rules the record store enforces.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`User`] - The protected record
//! - [`UserIndex`] - External, URL-facing identifier
//! - [`ApiKey`] - The secret credential, sole authentication factor
//! - [`NewUser`] / [`UserUpdate`] - Create and update payloads

pub mod error;
pub mod types;
pub mod user;
pub mod validation;

pub use error::ValidationError;
pub use types::{fingerprint, ApiKey, UserIndex, KEY_LEN};
pub use user::{NewUser, User, UserUpdate};
pub use validation::{validate_index, validate_key, validate_name, INDEX_MAX, NAME_MAX, NAME_MIN};
