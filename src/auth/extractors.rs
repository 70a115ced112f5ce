use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::{
    auth::repo_types::User,
    error::AppError,
    state::AppState,
};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// The caller behind a verified access token, loaded fresh from the store.
/// Rejects with 401 before the handler runs.
pub struct CurrentUser(pub User);

/// Cookie first, then `Authorization: Bearer <token>`.
fn candidate_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(ACCESS_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = candidate_token(parts).ok_or_else(|| AppError::unauthorized("Unauthorized request"))?;

        let claims = state.jwt.verify_access(&token).map_err(|e| {
            warn!(reason = %e, "access token rejected");
            AppError::from(e)
        })?;

        let user = state.users.find_by_id(claims.sub).await?.ok_or_else(|| {
            warn!(user_id = %claims.sub, "token for unknown user");
            AppError::unauthorized("Invalid access token")
        })?;

        Ok(CurrentUser(user))
    }
}
