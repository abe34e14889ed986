use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Clubpass API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Membership registration and door access for private clubs",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/auth/login",
            "public": "/public",
            "access": "/access/scan",
            "member": "/api/me",
            "admin": "/admin"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
