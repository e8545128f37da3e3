//! User API endpoints: signup and login.

use axum::{extract::State, Json};

use super::{created, success, ApiResult};
use crate::auth::{self, AuthUser};
use crate::errors::AppError;
use crate::models::{LoginData, LoginRequest, SignupRequest, User};
use crate::AppState;

/// POST /api/users/signup - Register a new user.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<User> {
    if request.email.trim().is_empty()
        || request.password.is_empty()
        || request.username.trim().is_empty()
    {
        return Err(AppError::Validation(
            "Email, password and username are all required".to_string(),
        ));
    }

    if state
        .repo
        .find_user_by_email(&request.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email is already in use".to_string()));
    }

    let password_hash = auth::hash_password(&request.password)?;
    let user = state
        .repo
        .create_user(&request.email, &password_hash, &request.username)
        .await?;

    tracing::info!(user_id = user.user_id, "New user registered");
    created(user, "Signup completed")
}

/// POST /api/users/login - Authenticate and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginData> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    // Unknown email and wrong password are indistinguishable to the caller.
    let record = state
        .repo
        .find_user_by_email(&request.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !auth::verify_password(&request.password, &record.password_hash) {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = auth::issue_token(record.user_id, &state.config.jwt_secret)?;

    success(LoginData {
        token,
        user: record.into_user(),
    })
}

/// GET /api/users/me - Profile of the authenticated user.
pub async fn current_user(State(state): State<AppState>, user: AuthUser) -> ApiResult<User> {
    let user = state
        .repo
        .find_user_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    success(user)
}
