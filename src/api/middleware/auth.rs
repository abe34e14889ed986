use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    auth::SESSION_COOKIE,
    domain::Member,
    error::AppError,
};

#[derive(Clone)]
pub struct CurrentUser {
    pub member: Member,
}

impl CurrentUser {
    pub fn is_admin(&self, state: &AppState) -> bool {
        self.member.is_admin || state.settings.admin.is_allowed(&self.member.email)
    }
}

async fn resolve_member(state: &AppState, jar: &CookieJar) -> Result<Member, AppError> {
    let session_cookie = jar
        .get(SESSION_COOKIE)
        .ok_or(AppError::Unauthorized)?;

    let session = state
        .service_context
        .auth_service
        .validate_session(session_cookie.value())
        .await?
        .ok_or(AppError::Unauthorized)?;

    state
        .service_context
        .member_repo
        .find_by_id(session.member_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let member = resolve_member(&state, &jar).await?;

    request.extensions_mut().insert(CurrentUser { member });

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let member = resolve_member(&state, &jar).await?;
    let current_user = CurrentUser { member };

    if !current_user.is_admin(&state) {
        tracing::warn!("Member {} denied admin access", current_user.member.id);
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}
