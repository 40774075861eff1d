//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::error::conversions::is_unique_violation;
use sqlx::PgPool;

use crate::domain::entity::user::{
    DEFAULT_LANGUAGE_CODE, DEFAULT_TIMEZONE, DEFAULT_UTC_OFFSET, NewUser, ProfileUpdate, User,
};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, nickname::Nickname, user_id::UserId, user_password::UserPassword,
    vector_status::VectorStatus,
};
use crate::error::{AuthError, AuthResult};

/// Column list shared by every query returning a full user row
macro_rules! user_columns {
    () => {
        r#"
            user_id,
            email,
            password,
            google_id,
            nickname,
            title,
            introduction,
            icon_url,
            ai_introduction,
            ai_introduction_vector,
            ai_introduction_vector_at,
            ai_personality,
            latitude,
            longitude,
            country_code,
            country_name,
            region,
            city,
            language_code,
            timezone,
            utc_offset,
            likes,
            dislikes,
            followers,
            chat_photo_url,
            chat_sound_url,
            login_ip,
            login_at,
            is_active,
            created_at,
            updated_at
        "#
    };
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: &NewUser) -> AuthResult<User> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, UserRow>(concat!(
            r#"
            INSERT INTO users (
                email,
                password,
                nickname,
                title,
                introduction,
                ai_introduction_vector,
                language_code,
                timezone,
                utc_offset,
                is_active,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10, $10)
            RETURNING "#,
            user_columns!()
        ))
        .bind(new_user.email.as_str())
        .bind(new_user.password.as_str())
        .bind(new_user.nickname.as_str())
        .bind(new_user.title.as_str())
        .bind(new_user.introduction.as_str())
        .bind(VectorStatus::Waiting.as_str())
        .bind(DEFAULT_LANGUAGE_CODE)
        .bind(DEFAULT_TIMEZONE)
        .bind(DEFAULT_UTC_OFFSET)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::EmailTaken
            } else {
                AuthError::Database(e)
            }
        })?;

        row.into_user()
    }

    async fn find_active_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE user_id = $1 AND is_active"
        ))
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_active_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE email = $1 AND is_active"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn record_login(
        &self,
        user_id: UserId,
        ip: Option<String>,
        at: DateTime<Utc>,
    ) -> AuthResult<()> {
        sqlx::query("UPDATE users SET login_ip = $2, login_at = $3 WHERE user_id = $1")
            .bind(user_id.value())
            .bind(ip)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_password(&self, user_id: UserId, password: &UserPassword) -> AuthResult<()> {
        sqlx::query("UPDATE users SET password = $2, updated_at = $3 WHERE user_id = $1")
            .bind(user_id.value())
            .bind(password.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> AuthResult<Option<User>> {
        // $5 says whether icon_url was sent at all, $6 carries the new value
        // (NULL clears it).
        let row = sqlx::query_as::<_, UserRow>(concat!(
            r#"
            UPDATE users SET
                nickname = COALESCE($2, nickname),
                title = COALESCE($3, title),
                introduction = COALESCE($4, introduction),
                icon_url = CASE WHEN $5 THEN $6 ELSE icon_url END,
                updated_at = $7
            WHERE user_id = $1 AND is_active
            RETURNING "#,
            user_columns!()
        ))
        .bind(user_id.value())
        .bind(update.nickname.as_ref().map(|n| n.as_str()))
        .bind(update.title.as_ref().map(|t| t.as_str()))
        .bind(update.introduction.as_ref().map(|i| i.as_str()))
        .bind(update.icon_url.is_some())
        .bind(update.icon_url.as_ref().and_then(|url| url.as_ref().map(|u| u.as_str())))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    email: String,
    password: Option<String>,
    google_id: Option<String>,
    nickname: String,
    title: Option<String>,
    introduction: Option<String>,
    icon_url: Option<String>,
    ai_introduction: Option<String>,
    ai_introduction_vector: String,
    ai_introduction_vector_at: Option<DateTime<Utc>>,
    ai_personality: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    country_code: Option<String>,
    country_name: Option<String>,
    region: Option<String>,
    city: Option<String>,
    language_code: String,
    timezone: String,
    utc_offset: String,
    likes: i32,
    dislikes: i32,
    followers: i32,
    chat_photo_url: Option<String>,
    chat_sound_url: Option<String>,
    login_ip: Option<String>,
    login_at: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let password = self.password.map(UserPassword::from_db).transpose()?;

        let ai_introduction_vector = self
            .ai_introduction_vector
            .parse::<VectorStatus>()
            .map_err(AuthError::Internal)?;

        Ok(User {
            user_id: UserId::new(self.user_id),
            email: Email::from_db(self.email),
            password,
            google_id: self.google_id,
            nickname: Nickname::from_db(self.nickname),
            title: self.title,
            introduction: self.introduction,
            icon_url: self.icon_url,
            ai_introduction: self.ai_introduction,
            ai_introduction_vector,
            ai_introduction_vector_at: self.ai_introduction_vector_at,
            ai_personality: self.ai_personality,
            latitude: self.latitude,
            longitude: self.longitude,
            country_code: self.country_code,
            country_name: self.country_name,
            region: self.region,
            city: self.city,
            language_code: self.language_code,
            timezone: self.timezone,
            utc_offset: self.utc_offset,
            likes: self.likes,
            dislikes: self.dislikes,
            followers: self.followers,
            chat_photo_url: self.chat_photo_url,
            chat_sound_url: self.chat_sound_url,
            login_ip: self.login_ip,
            login_at: self.login_at,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
