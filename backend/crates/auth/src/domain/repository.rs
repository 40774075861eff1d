//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer (`infra::postgres`, `infra::memory`).

use chrono::{DateTime, Utc};

use crate::domain::entity::user::{NewUser, ProfileUpdate, User};
use crate::domain::value_object::{email::Email, user_id::UserId, user_password::UserPassword};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user and return the stored row
    ///
    /// Fails with `AuthError::EmailTaken` when the email is already registered.
    async fn create(&self, new_user: &NewUser) -> AuthResult<User>;

    /// Find an active user by ID
    async fn find_active_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Find an active user by email
    async fn find_active_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if any user (active or not) owns the email
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Store the client IP and time of a successful login
    async fn record_login(
        &self,
        user_id: UserId,
        ip: Option<String>,
        at: DateTime<Utc>,
    ) -> AuthResult<()>;

    /// Replace the stored password hash
    async fn update_password(&self, user_id: UserId, password: &UserPassword) -> AuthResult<()>;

    /// Update the provided profile columns and `updated_at`
    ///
    /// Returns the refreshed active user, or `None` if no active user matched.
    async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> AuthResult<Option<User>>;
}
