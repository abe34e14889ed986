use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    api::state::AppState,
    auth::{AuthService, SESSION_COOKIE},
    domain::Member,
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub member: Member,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let credentials = state
        .service_context
        .member_repo
        .find_credentials(req.email.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !AuthService::verify_password(&req.password, &credentials.password_hash).await? {
        tracing::debug!("Failed login for member {}", credentials.member_id);
        return Err(AppError::Unauthorized);
    }

    let member = state
        .service_context
        .member_service
        .get(credentials.member_id)
        .await?;

    let auth_service = &state.service_context.auth_service;
    let (_session, token) = auth_service.create_session(member.id).await?;
    let cookie = auth_service.create_session_cookie(&token);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            member,
            message: "Login successful".to_string(),
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = state
            .service_context
            .auth_service
            .invalidate_session(session_cookie.value())
            .await
        {
            tracing::warn!("Failed to invalidate session: {}", e);
        }
    }

    let jar = jar.add(AuthService::create_logout_cookie());

    Ok((jar, StatusCode::NO_CONTENT))
}

/// Always 202 so the response does not reveal whether the email exists.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> StatusCode {
    if let Err(e) = state
        .service_context
        .password_reset_service
        .request(&req.email)
        .await
    {
        tracing::error!("Password reset request failed: {}", e);
    }
    StatusCode::ACCEPTED
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirm>,
) -> Result<StatusCode> {
    state
        .service_context
        .password_reset_service
        .confirm(&req.token, &req.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
