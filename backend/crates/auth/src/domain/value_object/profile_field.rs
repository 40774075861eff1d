//! Free-text profile fields
//!
//! `title` and `introduction` are plain text shown on the shop card,
//! `icon_url` points at an externally hosted image.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TITLE_MAX_LENGTH: usize = 100;
pub const INTRODUCTION_MAX_LENGTH: usize = 1000;
pub const ICON_URL_MAX_LENGTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileFieldError {
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} contains invalid control characters")]
    InvalidCharacter { field: &'static str },

    #[error("Icon URL must start with http:// or https://")]
    InvalidUrlScheme,
}

fn check_text(
    field: &'static str,
    value: &str,
    max: usize,
    allow_newlines: bool,
) -> Result<(), ProfileFieldError> {
    if value.chars().count() > max {
        return Err(ProfileFieldError::TooLong { field, max });
    }
    let bad_char = value
        .chars()
        .any(|c| c.is_control() && !(allow_newlines && matches!(c, '\n' | '\r' | '\t')));
    if bad_char {
        return Err(ProfileFieldError::InvalidCharacter { field });
    }
    Ok(())
}

/// One-line headline (may be empty)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Title(String);

impl Title {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProfileFieldError> {
        let value = raw.as_ref().trim();
        check_text("Title", value, TITLE_MAX_LENGTH, false)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Multi-line shop description (may be empty)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Introduction(String);

impl Introduction {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProfileFieldError> {
        let value = raw.as_ref().trim();
        check_text("Introduction", value, INTRODUCTION_MAX_LENGTH, true)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Profile image location
///
/// An empty input means "remove the icon" and yields `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconUrl(String);

impl IconUrl {
    pub fn parse(raw: impl AsRef<str>) -> Result<Option<Self>, ProfileFieldError> {
        let value = raw.as_ref().trim();
        if value.is_empty() {
            return Ok(None);
        }
        check_text("Icon URL", value, ICON_URL_MAX_LENGTH, false)?;

        let lower = value.to_ascii_lowercase();
        let rest = lower
            .strip_prefix("https://")
            .or_else(|| lower.strip_prefix("http://"))
            .ok_or(ProfileFieldError::InvalidUrlScheme)?;
        if rest.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(ProfileFieldError::InvalidUrlScheme);
        }

        Ok(Some(Self(value.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        assert_eq!(Title::new("  동네 빵집 ").unwrap().as_str(), "동네 빵집");
        assert!(Title::new("").is_ok());
        assert_eq!(
            Title::new("a".repeat(101)),
            Err(ProfileFieldError::TooLong { field: "Title", max: 100 })
        );
        assert!(Title::new("line\nbreak").is_err());
    }

    #[test]
    fn test_introduction_allows_newlines() {
        assert!(Introduction::new("첫 줄\n둘째 줄").is_ok());
        assert!(Introduction::new("x".repeat(1000)).is_ok());
        assert!(Introduction::new("x".repeat(1001)).is_err());
        assert!(Introduction::new("bell\u{0007}").is_err());
    }

    #[test]
    fn test_icon_url() {
        let url = IconUrl::parse("https://cdn.example.com/a.png").unwrap();
        assert_eq!(url.unwrap().as_str(), "https://cdn.example.com/a.png");
        assert!(IconUrl::parse("HTTP://example.com/a.png").unwrap().is_some());
        assert_eq!(IconUrl::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_icon_url_rejects() {
        assert_eq!(
            IconUrl::parse("javascript:alert(1)"),
            Err(ProfileFieldError::InvalidUrlScheme)
        );
        assert_eq!(
            IconUrl::parse("https://"),
            Err(ProfileFieldError::InvalidUrlScheme)
        );
        assert_eq!(
            IconUrl::parse("https://a.com/x y.png"),
            Err(ProfileFieldError::InvalidUrlScheme)
        );
        let long = format!("https://example.com/{}", "a".repeat(500));
        assert!(matches!(
            IconUrl::parse(long),
            Err(ProfileFieldError::TooLong { .. })
        ));
    }
}
