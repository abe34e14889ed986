use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{api::state::AppState, domain::AccessDecision};

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub granted: bool,
    pub decision: AccessDecision,
    pub message: String,
}

/// Door scanner endpoint. Every outcome is a 200 with the decision in the body.
pub async fn scan(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Json<ScanResponse> {
    let decision = state
        .service_context
        .access_service
        .check_token(&request.token)
        .await;

    Json(ScanResponse {
        granted: decision.is_granted(),
        decision,
        message: decision.message().to_string(),
    })
}
