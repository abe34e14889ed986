pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let uploads_dir = settings.storage.uploads_dir.clone();
    let body_limit = photo_body_limit(settings.storage.max_image_bytes);
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // Auth routes
        .nest("/auth", auth_routes())

        // Door scanner
        .route("/access/scan", post(handlers::access::scan))

        // Public routes (signup flow)
        .nest("/public", public_routes(body_limit))

        // Signed-in member
        .nest("/api", member_routes(app_state.clone()))

        // Admin routes
        .nest("/admin", admin_routes(app_state.clone(), body_limit))

        // Stored photos are admin-only
        .nest_service(
            "/uploads",
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    app_state.clone(),
                    middleware::auth::require_admin,
                ))
                .service(ServeDir::new(uploads_dir)),
        )

        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Body limit for requests carrying two base64 photos: each image grows by 4/3
/// when encoded, plus room for the form fields.
fn photo_body_limit(max_image_bytes: usize) -> usize {
    max_image_bytes.saturating_mul(8) / 3 + 1024 * 1024
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/password-reset", post(handlers::auth::request_password_reset))
        .route("/password-reset/confirm", post(handlers::auth::confirm_password_reset))
}

fn public_routes(photo_body_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/signup",
            post(handlers::public::signup).layer(DefaultBodyLimit::max(photo_body_limit)),
        )
        .route("/member-count", get(handlers::public::member_count))
        .route("/pricing", get(handlers::public::pricing))
        .route("/payments/intent", post(handlers::payments::create_intent))
        .route("/payments/sheet", post(handlers::payments::create_sheet))
}

fn member_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::members::me))
        .route(
            "/me/access-tokens",
            get(handlers::members::list_access_tokens).post(handlers::members::issue_access_token),
        )
        .route("/me/upgrade/intent", post(handlers::payments::create_upgrade_intent))
        .route("/me/upgrade", post(handlers::members::upgrade))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn admin_routes(state: AppState, photo_body_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/members",
            get(handlers::admin::list)
                .post(handlers::admin::enroll)
                .layer(DefaultBodyLimit::max(photo_body_limit)),
        )
        .route("/members/search", get(handlers::admin::search))
        .route("/members/prefix", get(handlers::admin::by_name_prefix))
        .route("/members/transaction", get(handlers::admin::by_transaction))
        .route("/members/club/:club", get(handlers::admin::by_club))
        .route("/members/payment-method/:method", get(handlers::admin::by_payment_method))
        .route("/members/activated/:date", get(handlers::admin::activated_on))
        .route("/members/:id", get(handlers::admin::get))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
