//! API DTOs (Data Transfer Objects)
//!
//! Field names are snake_case on the wire to match the `users` columns the
//! dashboard already reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;
use crate::domain::value_object::{user_id::UserId, vector_status::VectorStatus};

// ============================================================================
// Envelope
// ============================================================================

/// Success envelope: `{ "success": true, "message"?: ..., "data": ... }`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// Register request
///
/// Every field is optional at the serde level so missing fields produce the
/// same 400 envelope as empty ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub nickname: Option<String>,
    pub title: Option<String>,
    pub introduction: Option<String>,
}

/// Fields returned right after registration
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub user_id: UserId,
    pub email: String,
    pub nickname: String,
    pub title: String,
    pub introduction: String,
}

impl From<&User> for RegisteredUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.as_str().to_string(),
            nickname: user.nickname.as_str().to_string(),
            title: user.title.clone().unwrap_or_default(),
            introduction: user.introduction.clone().unwrap_or_default(),
        }
    }
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `{ token, user }` payload of register and login
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse<U> {
    pub token: String,
    pub user: U,
}

// ============================================================================
// Profile
// ============================================================================

/// Profile update request; an empty `icon_url` removes the icon
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub nickname: Option<String>,
    pub title: Option<String>,
    pub introduction: Option<String>,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

/// Full user row without the password hash
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub email: String,
    pub google_id: Option<String>,
    pub nickname: String,
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

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.into_inner(),
            google_id: user.google_id,
            nickname: user.nickname.into_inner(),
            title: user.title,
            introduction: user.introduction,
            icon_url: user.icon_url,
            ai_introduction: user.ai_introduction,
            ai_introduction_vector: user.ai_introduction_vector,
            ai_introduction_vector_at: user.ai_introduction_vector_at,
            ai_personality: user.ai_personality,
            latitude: user.latitude,
            longitude: user.longitude,
            country_code: user.country_code,
            country_name: user.country_name,
            region: user.region,
            city: user.city,
            language_code: user.language_code,
            timezone: user.timezone,
            utc_offset: user.utc_offset,
            likes: user.likes,
            dislikes: user.dislikes,
            followers: user.followers,
            chat_photo_url: user.chat_photo_url,
            chat_sound_url: user.chat_sound_url,
            login_ip: user.login_ip,
            login_at: user.login_at,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
