//! # Peruser Testkit
//!
//! Testing utilities for Peruser.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A seeded store with a known cast of users and keys
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use peruser_perms::Predicate;
//! use peruser_testkit::TestFixture;
//!
//! let fixture = TestFixture::seeded().await;
//! let gate = fixture.gate();
//! let decision = gate.check(Some(fixture.alice.key.as_str()), &Predicate::Admin).await;
//! assert!(!decision.is_allowed());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use peruser_testkit::generators::UserParams;
//!
//! proptest! {
//!     #[test]
//!     fn admin_implies_enabled(params: UserParams) {
//!         let user = params.to_user();
//!         prop_assert!(!user.is_admin() || user.is_enabled());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{key_of, TestFixture};
pub use generators::{predicate, UserParams};
