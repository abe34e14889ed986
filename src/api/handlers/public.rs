use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    domain::{MembershipTier, PaymentMethod},
    error::Result,
    service::{Pricing, RegisterRequest},
};

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub member_id: Uuid,
    pub membership_type: MembershipTier,
    pub payment_method: PaymentMethod,
    pub expires_at: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MemberCount {
    pub count: i64,
}

/// Registers a member and signs them in.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SignupResponse>)> {
    let member = state
        .service_context
        .registration_service
        .register(request)
        .await?;

    let auth_service = &state.service_context.auth_service;
    let (_session, token) = auth_service.create_session(member.id).await?;
    let jar = jar.add(auth_service.create_session_cookie(&token));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(SignupResponse {
            member_id: member.id,
            membership_type: member.membership_type,
            payment_method: member.payment_method,
            expires_at: member.expires_at,
            message: "Registration successful".to_string(),
        }),
    ))
}

pub async fn member_count(State(state): State<AppState>) -> Result<Json<MemberCount>> {
    let count = state.service_context.member_service.count().await?;
    Ok(Json(MemberCount { count }))
}

pub async fn pricing(State(state): State<AppState>) -> Json<Pricing> {
    Json(state.service_context.payment_service.pricing())
}
