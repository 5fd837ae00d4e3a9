//! Strong type definitions for Peruser.
//!
//! The two identifiers of a user record are newtypes so an index can never be
//! passed where a credential is expected, and vice versa.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of an API key in characters.
pub const KEY_LEN: usize = 40;

/// External-facing identifier of a user record, used in URLs.
///
/// Stable for the lifetime of the record and unique across the store.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIndex(String);

impl UserIndex {
    /// Wrap a string as an index. No validation is performed here; see
    /// [`crate::validation::validate_index`].
    pub fn new(index: impl Into<String>) -> Self {
        Self(index.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserIndex({})", self.0)
    }
}

impl fmt::Display for UserIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserIndex {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for UserIndex {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for UserIndex {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The secret credential presented on every request.
///
/// `Debug` prints a fingerprint rather than the key itself, and there is no
/// `Display` impl, so a key cannot end up in a log line by accident.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a string as a key. No validation is performed here; see
    /// [`crate::validation::validate_key`].
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generate a fresh key: 20 random bytes, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN / 2];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short, non-reversible identifier for log lines.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.0)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.fingerprint())
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Blake3 fingerprint of a raw credential string: the first 8 bytes, hex.
///
/// Usable on request-supplied strings that were never validated as keys.
pub fn fingerprint(raw: &str) -> String {
    let hash = blake3::hash(raw.as_bytes());
    hex::encode(&hash.as_bytes()[..8])
}
