//! Authentication HTTP handlers
//!
//! Endpoints for registration, login, and token lifecycle.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::models::{
    AuthTokensResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, SendCodeRequest,
    SendCodeResponse, UserResponse,
};
use crate::state::AppState;

/// Client metadata recorded on new sessions
pub(crate) fn client_meta(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.to_string())
        });
    let user_agent = headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    (ip, user_agent)
}

/// POST /api/auth/register/send-code - Email a registration code
pub async fn send_registration_code(
    State(state): State<AppState>,
    Json(req): Json<SendCodeRequest>,
) -> Result<Json<SendCodeResponse>, ApiError> {
    req.validate()?;

    let expires_in = state.auth_service.send_registration_code(&req.email).await?;

    Ok(Json(SendCodeResponse { expires_in }))
}

/// POST /api/auth/register - Complete registration with an emailed code
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    req.validate()?;

    let user = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/auth/login - Password login, returns a token pair
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthTokensResponse>, ApiError> {
    req.validate()?;

    let (ip, user_agent) = client_meta(&headers);
    let tokens = state
        .auth_service
        .login(&req.email, &req.password, ip, user_agent)
        .await?;

    Ok(Json(tokens))
}

/// POST /api/auth/refresh - Exchange a refresh token for a new pair
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<AuthTokensResponse>, ApiError> {
    let tokens = state.auth_service.refresh_tokens(&req.refresh_token).await?;

    Ok(Json(tokens))
}

/// POST /api/auth/logout - Revoke current session
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<StatusCode, ApiError> {
    state.auth_service.revoke_session(&user.jti).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/logout-all - Revoke all sessions for current user
pub async fn logout_all(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<LogoutAllResponse>, ApiError> {
    let revoked_sessions = state.auth_service.revoke_all_sessions(user.user_id).await?;

    Ok(Json(LogoutAllResponse { revoked_sessions }))
}

/// GET /api/auth/me - Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.auth_service.get_user_by_id(user.user_id).await?;

    Ok(Json(user.into()))
}

#[derive(Debug, serde::Serialize)]
pub struct LogoutAllResponse {
    pub revoked_sessions: u64,
}
