//! Field rules for user records.
//!
//! These are the schema constraints the record store enforces on create and
//! update. The authorization layer never calls them; it only reads.

use crate::error::ValidationError;
use crate::types::{ApiKey, UserIndex, KEY_LEN};

/// Minimum display name length in characters.
pub const NAME_MIN: usize = 3;

/// Maximum display name length in characters.
pub const NAME_MAX: usize = 20;

/// Maximum index length in characters.
pub const INDEX_MAX: usize = 64;

/// A key must be exactly [`KEY_LEN`] characters of `[0-9A-Za-z]`.
///
/// Keys travel in a header, so anything outside that set could be stored but
/// never presented.
pub fn validate_key(key: &ApiKey) -> Result<(), ValidationError> {
    let s = key.as_str();
    let got = s.chars().count();
    if got != KEY_LEN {
        return Err(ValidationError::KeyLength {
            expected: KEY_LEN,
            got,
        });
    }
    if let Some(c) = s.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(ValidationError::KeyCharacter(c));
    }
    Ok(())
}

/// A name must be [`NAME_MIN`]..=[`NAME_MAX`] characters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let got = name.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&got) {
        return Err(ValidationError::NameLength {
            min: NAME_MIN,
            max: NAME_MAX,
            got,
        });
    }
    Ok(())
}

/// An index appears in URL paths, so it is restricted to `[A-Za-z0-9._-]`.
pub fn validate_index(index: &UserIndex) -> Result<(), ValidationError> {
    let s = index.as_str();
    let got = s.chars().count();
    if got == 0 || got > INDEX_MAX {
        return Err(ValidationError::IndexLength {
            max: INDEX_MAX,
            got,
        });
    }
    if let Some(c) = s
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(ValidationError::IndexCharacter(c));
    }
    Ok(())
}
