//! User Entity
//!
//! One row of the `users` table: login credentials, the public shop profile
//! and the chatbot/locale settings the dashboard edits.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email,
    nickname::Nickname,
    profile_field::{IconUrl, Introduction, Title},
    user_id::UserId,
    user_password::UserPassword,
    vector_status::VectorStatus,
};

/// Locale assigned to new accounts
pub const DEFAULT_LANGUAGE_CODE: &str = "ko";
pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";
pub const DEFAULT_UTC_OFFSET: &str = "+09:00";

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub email: Email,
    /// `None` for accounts created through social login
    pub password: Option<UserPassword>,
    pub google_id: Option<String>,
    pub nickname: Nickname,
    pub title: Option<String>,
    pub introduction: Option<String>,
    pub icon_url: Option<String>,
    pub ai_introduction: Option<String>,
    pub ai_introduction_vector: VectorStatus,
    pub ai_introduction_vector_at: Option<DateTime<Utc>>,
    pub ai_personality: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub language_code: String,
    pub timezone: String,
    pub utc_offset: String,
    pub likes: i32,
    pub dislikes: i32,
    pub followers: i32,
    pub chat_photo_url: Option<String>,
    pub chat_sound_url: Option<String>,
    pub login_ip: Option<String>,
    pub login_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build the row a fresh registration produces
    pub fn register(user_id: UserId, new_user: &NewUser, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            email: new_user.email.clone(),
            password: Some(new_user.password.clone()),
            google_id: None,
            nickname: new_user.nickname.clone(),
            title: Some(new_user.title.as_str().to_string()),
            introduction: Some(new_user.introduction.as_str().to_string()),
            icon_url: None,
            ai_introduction: None,
            ai_introduction_vector: VectorStatus::Waiting,
            ai_introduction_vector_at: None,
            ai_personality: None,
            latitude: None,
            longitude: None,
            country_code: None,
            country_name: None,
            region: None,
            city: None,
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            utc_offset: DEFAULT_UTC_OFFSET.to_string(),
            likes: 0,
            dislikes: 0,
            followers: 0,
            chat_photo_url: None,
            chat_sound_url: None,
            login_ip: None,
            login_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record_login(&mut self, ip: Option<String>, at: DateTime<Utc>) {
        self.login_ip = ip;
        self.login_at = Some(at);
    }

    pub fn set_password(&mut self, password: UserPassword, at: DateTime<Utc>) {
        self.password = Some(password);
        self.updated_at = at;
    }

    /// Apply the provided profile fields
    pub fn apply_profile(&mut self, update: &ProfileUpdate, at: DateTime<Utc>) {
        if let Some(nickname) = &update.nickname {
            self.nickname = nickname.clone();
        }
        if let Some(title) = &update.title {
            self.title = Some(title.as_str().to_string());
        }
        if let Some(introduction) = &update.introduction {
            self.introduction = Some(introduction.as_str().to_string());
        }
        if let Some(icon_url) = &update.icon_url {
            self.icon_url = icon_url.as_ref().map(|url| url.as_str().to_string());
        }
        self.updated_at = at;
    }
}

/// Validated registration data
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password: UserPassword,
    pub nickname: Nickname,
    pub title: Title,
    pub introduction: Introduction,
}

/// Profile fields to change; `None` leaves a column untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub nickname: Option<Nickname>,
    pub title: Option<Title>,
    pub introduction: Option<Introduction>,
    /// `Some(None)` clears the icon
    pub icon_url: Option<Option<IconUrl>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none()
            && self.title.is_none()
            && self.introduction.is_none()
            && self.icon_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        let new_user = NewUser {
            email: Email::new("owner@cafe.kr").unwrap(),
            password: UserPassword::from_db(format!("$2b$04${}", "a".repeat(53))).unwrap(),
            nickname: Nickname::new("사장님").unwrap(),
            title: Title::default(),
            introduction: Introduction::default(),
        };
        User::register(UserId::new(1), &new_user, Utc::now())
    }

    #[test]
    fn test_register_defaults() {
        let user = sample();
        assert_eq!(user.language_code, "ko");
        assert_eq!(user.timezone, "Asia/Seoul");
        assert_eq!(user.utc_offset, "+09:00");
        assert_eq!(user.ai_introduction_vector, VectorStatus::Waiting);
        assert_eq!(user.title.as_deref(), Some(""));
        assert!(user.is_active);
        assert!(user.password.is_some());
    }

    #[test]
    fn test_apply_profile_partial() {
        let mut user = sample();
        user.icon_url = Some("https://a.com/i.png".to_string());

        let update = ProfileUpdate {
            title: Some(Title::new("빵집").unwrap()),
            icon_url: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());

        user.apply_profile(&update, Utc::now());
        assert_eq!(user.title.as_deref(), Some("빵집"));
        assert_eq!(user.icon_url, None);
        assert_eq!(user.nickname.as_str(), "사장님");
    }

    #[test]
    fn test_empty_update() {
        assert!(ProfileUpdate::default().is_empty());
    }
}
