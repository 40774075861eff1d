//! Common ID Types
//!
//! Type-safe wrappers around the `BIGSERIAL` primary keys used by the
//! database. Rows keep their integer keys on the wire (`user_id: 42`), the
//! marker type only exists at compile time.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::Id;
/// pub struct UserMarker;
/// type UserId = Id<UserMarker>;
///
/// let id = UserId::new(7);
/// assert_eq!(id.value(), 7);
/// ```
pub struct Id<T> {
    value: i64,
    _marker: PhantomData<fn() -> T>,
}

/// Error when parsing an ID from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("ID is not an integer: {0}")]
    NotAnInteger(String),
    #[error("ID must be positive (got {0})")]
    NotPositive(i64),
}

impl<T> Id<T> {
    /// Wrap a raw database key
    pub const fn new(value: i64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Wrap a key that came from outside (token claims, path params)
    pub fn try_new(value: i64) -> Result<Self, IdParseError> {
        if value <= 0 {
            return Err(IdParseError::NotPositive(value));
        }
        Ok(Self::new(value))
    }

    /// Raw key
    pub const fn value(&self) -> i64 {
        self.value
    }
}

// Manual impls: deriving would put bounds on the marker type.

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| IdParseError::NotAnInteger(s.to_string()))?;
        Self::try_new(value)
    }
}

impl<T> From<Id<T>> for i64 {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;
    type WidgetId = Id<Widget>;

    #[test]
    fn test_id_value() {
        let id = WidgetId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_try_new_rejects_non_positive() {
        assert_eq!(WidgetId::try_new(0), Err(IdParseError::NotPositive(0)));
        assert_eq!(WidgetId::try_new(-3), Err(IdParseError::NotPositive(-3)));
        assert!(WidgetId::try_new(1).is_ok());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("17".parse::<WidgetId>().unwrap().value(), 17);
        assert!(matches!(
            "abc".parse::<WidgetId>(),
            Err(IdParseError::NotAnInteger(_))
        ));
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&WidgetId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: WidgetId = serde_json::from_str("9").unwrap();
        assert_eq!(back, WidgetId::new(9));
    }
}
