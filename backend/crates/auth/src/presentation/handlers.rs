//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use std::sync::Arc;

use kernel::error::app_error::AppError;
use platform::client::ClientIp;

use crate::application::config::AuthConfig;
use crate::application::{
    LoginInput, LoginUseCase, ProfileUseCase, RegisterInput, RegisterUseCase, UpdateProfileInput,
};
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ApiResponse, LoginRequest, ProfileResponse, RegisterRequest, RegisteredUser, TokenResponse,
    UpdateProfileRequest, UserResponse,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// Body extractor result, turned into the common error envelope on failure
type JsonBody<T> = Result<Json<T>, JsonRejection>;

fn json_body<T>(body: JsonBody<T>) -> AuthResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AuthError::App(AppError::from(rejection)))
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    body: JsonBody<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<ApiResponse<TokenResponse<RegisteredUser>>>)>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let req = json_body(body)?;

    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(RegisterInput {
            email: req.email,
            password: req.password,
            nickname: req.nickname,
            title: req.title,
            introduction: req.introduction,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "User registered successfully",
            TokenResponse {
                token: output.token,
                user: RegisteredUser::from(&output.user),
            },
        )),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    client_ip: ClientIp,
    body: JsonBody<LoginRequest>,
) -> AuthResult<Json<ApiResponse<TokenResponse<UserResponse>>>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let req = json_body(body)?;

    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
            client_ip: client_ip.to_db_string(),
        })
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Login successful",
        TokenResponse {
            token: output.token,
            user: UserResponse::from(output.user),
        },
    )))
}

// ============================================================================
// Profile (requires authentication)
// ============================================================================

/// GET /api/auth/profile
pub async fn get_profile(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<ApiResponse<ProfileResponse>> {
    Json(ApiResponse::ok(ProfileResponse {
        user: UserResponse::from(user),
    }))
}

/// PUT /api/auth/profile
pub async fn update_profile<R>(
    State(state): State<AuthAppState<R>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: JsonBody<UpdateProfileRequest>,
) -> AuthResult<Json<ApiResponse<ProfileResponse>>>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let req = json_body(body)?;

    let use_case = ProfileUseCase::new(state.repo.clone());

    let updated = use_case
        .update(
            user.user_id,
            UpdateProfileInput {
                nickname: req.nickname,
                title: req.title,
                introduction: req.introduction,
                icon_url: req.icon_url,
            },
        )
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Profile updated successfully",
        ProfileResponse {
            user: UserResponse::from(updated),
        },
    )))
}
