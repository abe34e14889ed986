use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::Member,
    error::{AppError, Result},
    service::EnrollRequest,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PrefixQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub id: Option<String>,
}

pub async fn enroll(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(request): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<Member>)> {
    let member = state
        .service_context
        .registration_service
        .enroll(request)
        .await?;

    tracing::info!("Admin {} enrolled member {}", current_user.member.id, member.id);
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Member>>> {
    Ok(Json(state.service_context.member_service.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Member>> {
    Ok(Json(state.service_context.member_service.get(id).await?))
}

pub async fn by_club(
    State(state): State<AppState>,
    Path(club): Path<String>,
) -> Result<Json<Vec<Member>>> {
    Ok(Json(state.service_context.member_service.by_club(&club).await?))
}

pub async fn by_payment_method(
    State(state): State<AppState>,
    Path(method): Path<String>,
) -> Result<Json<Vec<Member>>> {
    Ok(Json(
        state
            .service_context
            .member_service
            .by_payment_method(&method)
            .await?,
    ))
}

pub async fn activated_on(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Member>>> {
    let day = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest("Date must be formatted as YYYY-MM-DD".to_string())
    })?;
    Ok(Json(state.service_context.member_service.activated_on(day).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Member>>> {
    let term = query.q.unwrap_or_default();
    Ok(Json(state.service_context.member_service.search_text(&term).await?))
}

pub async fn by_name_prefix(
    State(state): State<AppState>,
    Query(query): Query<PrefixQuery>,
) -> Result<Json<Vec<Member>>> {
    let prefix = query.name.unwrap_or_default();
    Ok(Json(
        state
            .service_context
            .member_service
            .by_name_prefix(&prefix)
            .await?,
    ))
}

pub async fn by_transaction(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Member>>> {
    let id = query.id.unwrap_or_default();
    Ok(Json(
        state
            .service_context
            .member_service
            .by_transaction_id(&id)
            .await?,
    ))
}
