use axum::{
    extract::State,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::MembershipTier,
    error::{AppError, Result},
    payments::{PaymentIntentHandle, PaymentSheet},
};

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub membership_type: Option<MembershipTier>,
}

impl CreateIntentRequest {
    fn tier(&self) -> Result<MembershipTier> {
        self.membership_type.ok_or_else(|| {
            AppError::Validation("Please select a membership type".to_string())
        })
    }
}

pub async fn create_intent(
    State(state): State<AppState>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<PaymentIntentHandle>> {
    let handle = state
        .service_context
        .payment_service
        .create_registration_intent(request.tier()?)
        .await?;
    Ok(Json(handle))
}

pub async fn create_sheet(
    State(state): State<AppState>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<PaymentSheet>> {
    let sheet = state
        .service_context
        .payment_service
        .create_registration_sheet(request.tier()?)
        .await?;
    Ok(Json(sheet))
}

pub async fn create_upgrade_intent(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<PaymentIntentHandle>> {
    if current_user.member.membership_type == MembershipTier::Vip {
        return Err(AppError::BadRequest(
            "You already have a VIP Membership".to_string(),
        ));
    }

    let handle = state
        .service_context
        .payment_service
        .create_upgrade_intent(current_user.member.id)
        .await?;
    Ok(Json(handle))
}
