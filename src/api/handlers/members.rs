use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{AccessToken, Member, Payment},
    error::Result,
    service::IssuedAccessToken,
};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub member: Member,
    pub is_admin: bool,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    pub payment_intent_id: String,
}

pub async fn me(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<ProfileResponse>> {
    let is_admin = current_user.is_admin(&state);
    let payments = state
        .service_context
        .member_service
        .payments(current_user.member.id)
        .await?;

    Ok(Json(ProfileResponse {
        member: current_user.member,
        is_admin,
        payments,
    }))
}

pub async fn issue_access_token(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<(StatusCode, Json<IssuedAccessToken>)> {
    let issued = state
        .service_context
        .access_service
        .issue(current_user.member.id)
        .await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

pub async fn list_access_tokens(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<Vec<AccessToken>>> {
    let tokens = state
        .service_context
        .access_service
        .list(current_user.member.id)
        .await?;
    Ok(Json(tokens))
}

pub async fn upgrade(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(request): Json<UpgradeRequest>,
) -> Result<Json<Member>> {
    let member = state
        .service_context
        .member_service
        .upgrade(current_user.member.id, &request.payment_intent_id)
        .await?;
    Ok(Json(member))
}
