//! Profile Use Case
//!
//! Edits the signed-in user's public profile. Reading it needs no use case:
//! the auth middleware already loaded the row.

use std::sync::Arc;

use crate::domain::entity::user::{ProfileUpdate, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    nickname::Nickname,
    profile_field::{IconUrl, Introduction, Title},
    user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

/// Update input; absent fields are left unchanged
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub nickname: Option<String>,
    pub title: Option<String>,
    pub introduction: Option<String>,
    pub icon_url: Option<String>,
}

impl UpdateProfileInput {
    fn into_update(self) -> AuthResult<ProfileUpdate> {
        Ok(ProfileUpdate {
            nickname: self.nickname.map(Nickname::new).transpose()?,
            title: self.title.map(Title::new).transpose()?,
            introduction: self.introduction.map(Introduction::new).transpose()?,
            icon_url: self.icon_url.map(IconUrl::parse).transpose()?,
        })
    }
}

pub struct ProfileUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
}

impl<R> ProfileUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn update(&self, user_id: UserId, input: UpdateProfileInput) -> AuthResult<User> {
        let update = input.into_update()?;
        if update.is_empty() {
            return Err(AuthError::NoProfileFields);
        }

        let user = self
            .repo
            .update_profile(user_id, &update)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!(user_id = %user.user_id, "Profile updated");

        Ok(user)
    }
}
