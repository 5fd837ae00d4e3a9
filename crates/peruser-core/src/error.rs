//! Error types for Peruser Core.

use thiserror::Error;

/// Field-level validation failures for user records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api key must be exactly {expected} characters, got {got}")]
    KeyLength { expected: usize, got: usize },

    #[error("api key must be ASCII letters and digits, found {0:?}")]
    KeyCharacter(char),

    #[error("name must be between {min} and {max} characters, got {got}")]
    NameLength { min: usize, max: usize, got: usize },

    #[error("index must be between 1 and {max} characters, got {got}")]
    IndexLength { max: usize, got: usize },

    #[error("index contains invalid character {0:?}")]
    IndexCharacter(char),
}
