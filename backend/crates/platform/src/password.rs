//! Password Hashing and Verification
//!
//! bcrypt-based password handling with:
//! - Policy checks for newly chosen passwords
//! - Zeroization of clear text on drop
//! - Cost tracking so old hashes can be upgraded after login
//!
//! bcrypt only reads the first 72 bytes of its input, so new passwords are
//! capped at that length instead of being silently truncated.

use std::fmt;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in bytes (bcrypt input limit)
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Lowest cost bcrypt accepts
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts
pub const MAX_COST: u32 = 31;

/// Default work factor
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Clamp a configured cost into the range bcrypt accepts
pub fn clamp_cost(cost: u32) -> u32 {
    cost.clamp(MIN_COST, MAX_COST)
}

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} bytes (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

impl From<bcrypt::BcryptError> for PasswordHashError {
    fn from(err: bcrypt::BcryptError) -> Self {
        match err {
            bcrypt::BcryptError::InvalidHash(_)
            | bcrypt::BcryptError::InvalidPrefix(_)
            | bcrypt::BcryptError::InvalidCost(_) => PasswordHashError::InvalidHashFormat,
            other => PasswordHashError::HashingFailed(other.to_string()),
        }
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone`
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a newly chosen password, enforcing the policy
    ///
    /// - At least [`MIN_PASSWORD_LENGTH`] characters
    /// - At most [`MAX_PASSWORD_BYTES`] bytes
    /// - No control characters
    /// - Not whitespace only
    /// - Not a well-known weak pattern
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let candidate = Self(raw);

        if candidate.0.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = candidate.0.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        let byte_len = candidate.0.len();
        if byte_len > MAX_PASSWORD_BYTES {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_BYTES,
                actual: byte_len,
            });
        }

        if candidate
            .0
            .chars()
            .any(|ch| ch.is_control() && ch != '\t')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(&candidate.0) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(candidate)
    }

    /// Wrap a password submitted at login
    ///
    /// Only emptiness is checked: stored hashes may predate the policy.
    pub fn for_verification(raw: String) -> Result<Self, PasswordPolicyError> {
        if raw.is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }
        Ok(Self(raw))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash with bcrypt at the given cost (clamped to the valid range)
    ///
    /// CPU-bound: call from a blocking context.
    pub fn hash(&self, cost: u32) -> Result<HashedPassword, PasswordHashError> {
        let hash = bcrypt::hash(self.as_bytes(), clamp_cost(cost))?;
        Ok(HashedPassword { hash })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// bcrypt hash in modular crypt format (`$2b$12$<salt><hash>`)
///
/// Hashes produced by other bcrypt implementations (`$2a$`, `$2y$`) are
/// accepted for verification.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from a stored hash string
    pub fn from_hash(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        parse_cost(&hash).ok_or(PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    /// Hash string for storage
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Work factor encoded in the hash
    pub fn cost(&self) -> u32 {
        parse_cost(&self.hash).unwrap_or(0)
    }

    /// Verify a password against this hash
    ///
    /// CPU-bound: call from a blocking context.
    pub fn verify(&self, password: &ClearTextPassword) -> Result<bool, PasswordHashError> {
        Ok(bcrypt::verify(password.as_bytes(), &self.hash)?)
    }

    /// Whether the hash was produced with a lower cost than `target_cost`
    pub fn needs_rehash(&self, target_cost: u32) -> bool {
        self.cost() < clamp_cost(target_cost)
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .field("cost", &self.cost())
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse the cost of a `$2x$NN$...` hash, validating its overall shape
fn parse_cost(hash: &str) -> Option<u32> {
    if hash.len() != 60 {
        return None;
    }
    let mut parts = hash.split('$');
    // Leading empty segment before the first '$'
    if parts.next() != Some("") {
        return None;
    }
    match parts.next() {
        Some("2a" | "2b" | "2y") => {}
        _ => return None,
    }
    let cost = parts.next()?;
    if cost.len() != 2 {
        return None;
    }
    let cost: u32 = cost.parse().ok()?;
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return None;
    }
    let rest = parts.next()?;
    if rest.len() != 53 || parts.next().is_some() {
        return None;
    }
    Some(cost)
}

/// Check for common weak patterns
fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    // All the same character (e.g., "aaaaaaaa")
    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &[
        "qwerty",
        "asdfgh",
        "zxcvbn",
        "qazwsx",
        "1qaz2wsx",
    ];

    if KEYBOARD_PATTERNS.iter().any(|pattern| lower.contains(pattern)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password",
        "password1",
        "password123",
        "12345678",
        "123456789",
        "1234567890",
        "abcdefgh",
        "abcd1234",
        "letmein1",
        "welcome1",
        "admin123",
        "iloveyou",
        "sunshine",
        "princess",
        "football",
        "baseball",
        "trustno1",
    ];

    COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Whether the string is only a run of ascending/descending digits
fn is_sequential_numbers(s: &str) -> bool {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() < 4 {
        return false;
    }

    let is_ascending = digits
        .windows(2)
        .all(|w| w[1] == w[0] + 1 || (w[0] == 9 && w[1] == 0));

    let is_descending = digits
        .windows(2)
        .all(|w| w[0] == w[1] + 1 || (w[0] == 0 && w[1] == 9));

    is_ascending || is_descending
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Fastest cost bcrypt allows; keeps the suite quick
    const TEST_COST: u32 = MIN_COST;

    #[test]
    fn test_password_too_short() {
        let result = ClearTextPassword::new("short".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::TooShort { min: 8, actual: 5 })
        ));
    }

    #[test]
    fn test_password_too_long_counts_bytes() {
        // 25 Hangul syllables = 75 bytes in UTF-8
        let result = ClearTextPassword::new("가".repeat(25));
        assert!(matches!(
            result,
            Err(PasswordPolicyError::TooLong { max: 72, actual: 75 })
        ));
    }

    #[test]
    fn test_password_whitespace_only() {
        let result = ClearTextPassword::new("          ".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_password_control_character() {
        let result = ClearTextPassword::new("Good\u{0007}Pass99".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::InvalidCharacter)));
    }

    #[test]
    fn test_password_common_pattern() {
        for weak in ["password123", "qwerty12345", "12345678", "98765432", "zzzzzzzz"] {
            let result = ClearTextPassword::new(weak.to_string());
            assert!(
                matches!(result, Err(PasswordPolicyError::CommonPattern)),
                "{weak} should be rejected"
            );
        }
    }

    #[test]
    fn test_valid_password() {
        assert!(ClearTextPassword::new("MySecure#Pass2024!".to_string()).is_ok());
        assert!(ClearTextPassword::new("비밀번호는안전해요!".to_string()).is_ok());
    }

    #[test]
    fn test_for_verification_skips_policy() {
        assert!(ClearTextPassword::for_verification("short".to_string()).is_ok());
        assert!(ClearTextPassword::for_verification(String::new()).is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = password.hash(TEST_COST).unwrap();

        assert!(hashed.verify(&password).unwrap());

        let wrong = ClearTextPassword::for_verification("WrongPassword123!".to_string()).unwrap();
        assert!(!hashed.verify(&wrong).unwrap());
    }

    #[test]
    fn test_stored_hash_roundtrip() {
        let password = ClearTextPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = password.hash(TEST_COST).unwrap();

        let restored = HashedPassword::from_hash(hashed.as_str().to_string()).unwrap();
        assert_eq!(restored.cost(), TEST_COST);
        assert!(restored.verify(&password).unwrap());
    }

    #[test]
    fn test_accepts_2a_prefix() {
        // Hash format written by JavaScript bcrypt libraries
        let legacy = "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";
        let hashed = HashedPassword::from_hash(legacy).unwrap();
        assert_eq!(hashed.cost(), 10);
    }

    #[test]
    fn test_invalid_hash_string() {
        assert!(HashedPassword::from_hash("not_a_valid_hash").is_err());
        assert!(HashedPassword::from_hash("$argon2id$v=19$m=19456,t=2,p=1$abc$def").is_err());
        let bad_cost = format!("$2b$99${}", "a".repeat(53));
        assert!(HashedPassword::from_hash(bad_cost).is_err());
    }

    #[test]
    fn test_needs_rehash() {
        let password = ClearTextPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = password.hash(TEST_COST).unwrap();

        assert!(hashed.needs_rehash(TEST_COST + 1));
        assert!(!hashed.needs_rehash(TEST_COST));
        // Configured costs below bcrypt's minimum are clamped first
        assert!(!hashed.needs_rehash(1));
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::for_verification("secret-value".to_string()).unwrap();
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret-value"));
    }

    #[test]
    fn test_clamp_cost() {
        assert_eq!(clamp_cost(0), MIN_COST);
        assert_eq!(clamp_cost(12), 12);
        assert_eq!(clamp_cost(40), MAX_COST);
    }
}
