//! User Password Value Object
//!
//! Domain wrapper over `platform::password` that turns policy failures into
//! user-facing `AppError`s and keeps bcrypt work off the async runtime.
//!
//! ## Usage
//! ```rust,ignore
//! let raw = RawPassword::new("MySecure#Pass2024!".to_string())?;
//! let hashed = UserPassword::hash_blocking(raw, 12).await?;
//! ```

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError,
};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Password chosen at registration, checked against the policy
    pub fn new(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(policy_error)?;
        Ok(Self(clear_text))
    }

    /// Password typed at login, only required to be non-empty
    pub fn for_login(raw: String) -> AppResult<Self> {
        let clear_text = ClearTextPassword::for_verification(raw).map_err(policy_error)?;
        Ok(Self(clear_text))
    }

    fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

fn policy_error(err: PasswordPolicyError) -> AppError {
    let action = match &err {
        PasswordPolicyError::TooShort { .. } => "Please choose a longer password",
        PasswordPolicyError::TooLong { .. } => "Please choose a shorter password",
        PasswordPolicyError::EmptyOrWhitespace => "Please enter a password",
        PasswordPolicyError::InvalidCharacter => "Please remove any special control characters",
        PasswordPolicyError::CommonPattern => "Please choose a more unique password",
    };
    AppError::bad_request(err.to_string()).with_action(action)
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// bcrypt hash stored in `users.password`
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

/// Outcome of checking a login password
#[derive(Debug)]
pub enum PasswordCheck {
    Mismatch,
    /// `upgraded` holds a fresh hash when the stored one used a lower cost
    Match { upgraded: Option<UserPassword> },
}

impl UserPassword {
    /// Hash synchronously (CPU-bound)
    pub fn from_raw(raw: &RawPassword, cost: u32) -> AppResult<Self> {
        raw.inner().hash(cost).map(Self).map_err(hash_error)
    }

    /// Hash on the blocking thread pool
    pub async fn hash_blocking(raw: RawPassword, cost: u32) -> AppResult<Self> {
        tokio::task::spawn_blocking(move || Self::from_raw(&raw, cost))
            .await
            .map_err(|e| AppError::internal("Password hashing task failed").with_source(e))?
    }

    /// Wrap a hash read back from the database
    pub fn from_db(hash: impl Into<String>) -> AppResult<Self> {
        HashedPassword::from_hash(hash)
            .map(Self)
            .map_err(|_| AppError::internal("Invalid password hash in database"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn cost(&self) -> u32 {
        self.0.cost()
    }

    pub fn verify(&self, raw: &RawPassword) -> AppResult<bool> {
        self.0.verify(raw.inner()).map_err(hash_error)
    }

    /// Verify on the blocking thread pool, rehashing when `cost` went up
    pub async fn check_blocking(&self, raw: RawPassword, cost: u32) -> AppResult<PasswordCheck> {
        let stored = self.clone();
        tokio::task::spawn_blocking(move || {
            if !stored.verify(&raw)? {
                return Ok(PasswordCheck::Mismatch);
            }
            let upgraded = if stored.0.needs_rehash(cost) {
                Some(Self::from_raw(&raw, cost)?)
            } else {
                None
            };
            Ok(PasswordCheck::Match { upgraded })
        })
        .await
        .map_err(|e| AppError::internal("Password verification task failed").with_source(e))?
    }
}

fn hash_error(err: PasswordHashError) -> AppError {
    match err {
        PasswordHashError::InvalidHashFormat => {
            AppError::internal("Invalid password hash in database")
        }
        PasswordHashError::HashingFailed(msg) => {
            AppError::internal(format!("Password hashing failed: {msg}"))
        }
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .field("cost", &self.cost())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::error::kind::ErrorKind;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_policy_errors_are_bad_requests() {
        let err = RawPassword::new("short".to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.action(), Some("Please choose a longer password"));

        let err = RawPassword::new("password123".to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn test_login_password_skips_policy() {
        assert!(RawPassword::for_login("1234".to_string()).is_ok());
        assert!(RawPassword::for_login(String::new()).is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, TEST_COST).unwrap();
        assert!(hashed.verify(&raw).unwrap());

        let wrong = RawPassword::for_login("WrongPassword123!".to_string()).unwrap();
        assert!(!hashed.verify(&wrong).unwrap());
    }

    #[test]
    fn test_from_db_rejects_garbage() {
        let err = UserPassword::from_db("plaintext").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalServerError);
    }

    #[tokio::test]
    async fn test_check_blocking_upgrades_cost() {
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, TEST_COST).unwrap();

        let login = RawPassword::for_login("TestPassword123!".to_string()).unwrap();
        match hashed.check_blocking(login, TEST_COST + 1).await.unwrap() {
            PasswordCheck::Match { upgraded: Some(new_hash) } => {
                assert_eq!(new_hash.cost(), TEST_COST + 1);
            }
            other => panic!("expected upgraded match, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_check_blocking_mismatch() {
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::hash_blocking(raw, TEST_COST).await.unwrap();

        let login = RawPassword::for_login("nope".to_string()).unwrap();
        assert!(matches!(
            hashed.check_blocking(login, TEST_COST).await.unwrap(),
            PasswordCheck::Mismatch
        ));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("SecretPassword123!".to_string()).unwrap();
        let debug = format!("{:?}", raw);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("Secret"));
    }
}
