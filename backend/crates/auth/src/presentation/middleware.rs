//! Auth Middleware
//!
//! Bearer-token guard for protected routes.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::application::AuthenticateUseCase;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Authenticated user stored in request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that requires a valid bearer token for an active user
///
/// Rejections:
/// - no token → 401
/// - invalid or expired token → 403
/// - user missing or inactive → 401
pub async fn require_auth<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let use_case = AuthenticateUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case.execute(authorization.as_deref()).await?;

    tracing::debug!(user_id = %user.user_id, "Request authenticated");

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
