//! Nickname Value Object
//!
//! Display name shown on the dashboard and in chat. Not unique.
//!
//! Processing order: NFKC normalization → trim → validation. Full-width
//! forms collapse to their ASCII equivalents, Hangul is kept as composed
//! syllables.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Maximum nickname length (in characters, after normalization)
pub const NICKNAME_MAX_LENGTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NicknameError {
    #[error("Nickname cannot be empty")]
    Empty,

    #[error("Nickname must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Nickname contains invalid control characters")]
    InvalidCharacter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nickname(String);

impl Nickname {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, NicknameError> {
        let normalized: String = raw.as_ref().nfkc().collect();
        let trimmed = normalized.trim();

        if trimmed.is_empty() {
            return Err(NicknameError::Empty);
        }

        let actual = trimmed.chars().count();
        if actual > NICKNAME_MAX_LENGTH {
            return Err(NicknameError::TooLong {
                max: NICKNAME_MAX_LENGTH,
                actual,
            });
        }

        if trimmed.chars().any(char::is_control) {
            return Err(NicknameError::InvalidCharacter);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Wrap a value read back from the database
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nickname_valid() {
        assert_eq!(Nickname::new("카페사장").unwrap().as_str(), "카페사장");
        assert_eq!(Nickname::new("  Bakery Kim ").unwrap().as_str(), "Bakery Kim");
    }

    #[test]
    fn test_nickname_nfkc() {
        // Full-width Latin letters
        assert_eq!(Nickname::new("ＡＢＣ").unwrap().as_str(), "ABC");
        // Decomposed Hangul jamo compose into one syllable
        assert_eq!(Nickname::new("\u{1100}\u{1161}").unwrap().as_str(), "가");
    }

    #[test]
    fn test_nickname_empty() {
        assert_eq!(Nickname::new(""), Err(NicknameError::Empty));
        assert_eq!(Nickname::new("   "), Err(NicknameError::Empty));
        // Ideographic space normalizes to a plain space
        assert_eq!(Nickname::new("\u{3000}"), Err(NicknameError::Empty));
    }

    #[test]
    fn test_nickname_length_counts_chars() {
        assert!(Nickname::new("가".repeat(30)).is_ok());
        assert_eq!(
            Nickname::new("가".repeat(31)),
            Err(NicknameError::TooLong { max: 30, actual: 31 })
        );
    }

    #[test]
    fn test_nickname_control_chars() {
        assert_eq!(
            Nickname::new("bad\u{0000}name"),
            Err(NicknameError::InvalidCharacter)
        );
    }
}
