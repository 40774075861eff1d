//! Login Use Case
//!
//! Checks email + password and signs a token.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::register::non_blank;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{PasswordCheck, RawPassword},
};
use crate::error::{AuthError, AuthResult};

/// Login input
#[derive(Debug, Default)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Client address recorded as `login_ip`
    pub client_ip: Option<String>,
}

/// Login output
pub struct LoginOutput {
    pub token: String,
    pub user: User,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let (Some(email), Some(password)) = (
            non_blank(input.email),
            input.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::MissingFields("Email and password are required"));
        };

        // A malformed email cannot belong to any account
        let email = Email::new(email).map_err(|_| AuthError::InvalidCredentials)?;

        let mut user = self
            .repo
            .find_active_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Accounts created through social login have no password
        let Some(stored) = user.password.clone() else {
            return Err(AuthError::SocialAccount);
        };

        let raw_password = RawPassword::for_login(password)?;
        let check = stored
            .check_blocking(raw_password, self.config.bcrypt_cost)
            .await?;

        let now = Utc::now();
        match check {
            PasswordCheck::Mismatch => return Err(AuthError::InvalidCredentials),
            PasswordCheck::Match { upgraded: Some(new_hash) } => {
                self.repo.update_password(user.user_id, &new_hash).await?;
                tracing::info!(
                    user_id = %user.user_id,
                    from_cost = stored.cost(),
                    to_cost = new_hash.cost(),
                    "Upgraded password hash"
                );
                user.set_password(new_hash, now);
            }
            PasswordCheck::Match { upgraded: None } => {}
        }

        self.repo
            .record_login(user.user_id, input.client_ip.clone(), now)
            .await?;
        user.record_login(input.client_ip, now);

        let token = self.config.tokens.issue(user.user_id.value())?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(LoginOutput { token, user })
    }
}
