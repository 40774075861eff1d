//! Register Use Case
//!
//! Creates a new account and signs the first token.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    nickname::Nickname,
    profile_field::{Introduction, Title},
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Register input (fields as received)
#[derive(Debug, Default)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub nickname: Option<String>,
    pub title: Option<String>,
    pub introduction: Option<String>,
}

/// Register output
pub struct RegisterOutput {
    pub token: String,
    pub user: User,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> RegisterUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let (Some(email), Some(password), Some(nickname)) = (
            non_blank(input.email),
            input.password.filter(|p| !p.is_empty()),
            non_blank(input.nickname),
        ) else {
            return Err(AuthError::MissingFields(
                "Email, password and nickname are required",
            ));
        };

        let email = Email::new(email)?;
        let nickname = Nickname::new(nickname)?;
        let title = Title::new(input.title.unwrap_or_default())?;
        let introduction = Introduction::new(input.introduction.unwrap_or_default())?;
        let raw_password = RawPassword::new(password)?;

        if self.repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password = UserPassword::hash_blocking(raw_password, self.config.bcrypt_cost).await?;

        let new_user = NewUser {
            email,
            password,
            nickname,
            title,
            introduction,
        };

        // A concurrent registration can still win the race; create() maps
        // the unique violation to EmailTaken.
        let user = self.repo.create(&new_user).await?;
        let token = self.config.tokens.issue(user.user_id.value())?;

        tracing::info!(
            user_id = %user.user_id,
            email_domain = %user.email.domain(),
            "User registered"
        );

        Ok(RegisterOutput { token, user })
    }
}

/// Treat absent and whitespace-only fields alike
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
