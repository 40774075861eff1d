//! In-Memory Repository Implementation
//!
//! Process-local store used by tests and by debug builds started without a
//! database. Data is lost on restart.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::domain::entity::user::{NewUser, ProfileUpdate, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_id::UserId, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Store {
    users: BTreeMap<UserId, User>,
    last_id: i64,
}

impl Store {
    fn next_id(&mut self) -> UserId {
        self.last_id += 1;
        UserId::new(self.last_id)
    }

    fn email_in_use(&self, email: &Email) -> bool {
        self.users.values().any(|u| &u.email == email)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    store: Arc<Mutex<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AuthResult<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| AuthError::Internal("User store lock poisoned".to_string()))
    }

    /// Insert a prepared row under a fresh ID (e.g. a social-login account)
    pub fn insert(&self, mut user: User) -> AuthResult<User> {
        let mut store = self.lock()?;
        if store.email_in_use(&user.email) {
            return Err(AuthError::EmailTaken);
        }
        user.user_id = store.next_id();
        store.users.insert(user.user_id, user.clone());
        Ok(user)
    }

    /// Flip `is_active`, returning whether the user existed
    pub fn set_active(&self, user_id: UserId, active: bool) -> AuthResult<bool> {
        let mut store = self.lock()?;
        Ok(store
            .users
            .get_mut(&user_id)
            .map(|user| user.is_active = active)
            .is_some())
    }

    /// Stored row regardless of `is_active`
    #[cfg(test)]
    pub(crate) fn get(&self, user_id: UserId) -> Option<User> {
        self.lock().ok()?.users.get(&user_id).cloned()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: &NewUser) -> AuthResult<User> {
        let mut store = self.lock()?;
        if store.email_in_use(&new_user.email) {
            return Err(AuthError::EmailTaken);
        }
        let user = User::register(store.next_id(), new_user, Utc::now());
        store.users.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn find_active_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .get(&user_id)
            .filter(|u| u.is_active)
            .cloned())
    }

    async fn find_active_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.is_active && &u.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.lock()?.email_in_use(email))
    }

    async fn record_login(
        &self,
        user_id: UserId,
        ip: Option<String>,
        at: DateTime<Utc>,
    ) -> AuthResult<()> {
        if let Some(user) = self.lock()?.users.get_mut(&user_id) {
            user.record_login(ip, at);
        }
        Ok(())
    }

    async fn update_password(&self, user_id: UserId, password: &UserPassword) -> AuthResult<()> {
        if let Some(user) = self.lock()?.users.get_mut(&user_id) {
            user.set_password(password.clone(), Utc::now());
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> AuthResult<Option<User>> {
        let mut store = self.lock()?;
        let Some(user) = store.users.get_mut(&user_id).filter(|u| u.is_active) else {
            return Ok(None);
        };
        user.apply_profile(update, Utc::now());
        Ok(Some(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        nickname::Nickname,
        profile_field::{Introduction, Title},
    };

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::new(email).unwrap(),
            password: UserPassword::from_db(format!("$2b$04${}", "b".repeat(53))).unwrap(),
            nickname: Nickname::new("tester").unwrap(),
            title: Title::default(),
            introduction: Introduction::default(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();
        let a = repo.create(&new_user("a@example.com")).await.unwrap();
        let b = repo.create(&new_user("b@example.com")).await.unwrap();
        assert_eq!(a.user_id.value(), 1);
        assert_eq!(b.user_id.value(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(&new_user("a@example.com")).await.unwrap();
        let err = repo.create(&new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_inactive_users_hidden() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(&new_user("a@example.com")).await.unwrap();
        assert!(repo.set_active(user.user_id, false).unwrap());

        assert!(repo.find_active_by_id(user.user_id).await.unwrap().is_none());
        assert!(repo.find_active_by_email(&user.email).await.unwrap().is_none());
        assert!(repo.get(user.user_id).is_some());
        assert!(repo.exists_by_email(&user.email).await.unwrap());
        assert!(
            repo.update_profile(user.user_id, &ProfileUpdate::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_record_login() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(&new_user("a@example.com")).await.unwrap();
        let at = Utc::now();
        repo.record_login(user.user_id, Some("10.0.0.1".into()), at)
            .await
            .unwrap();

        let stored = repo.get(user.user_id).unwrap();
        assert_eq!(stored.login_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(stored.login_at, Some(at));
    }
}
