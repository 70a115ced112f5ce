use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, PublicUser, RefreshRequest,
            RegisterRequest, TokenPair, UpdateDetailsRequest,
        },
        extractors::{CurrentUser, ACCESS_COOKIE, REFRESH_COOKIE},
        services,
    },
    error::AppResult,
    extract::Json,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/refresh-token", post(refresh))
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/users/logout", post(logout))
        .route("/users/change-password", post(change_password))
        .route("/users/current-user", get(current_user))
        .route("/users/update-details", patch(update_details))
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

fn with_session(jar: CookieJar, pair: &TokenPair, secure: bool) -> CookieJar {
    jar.add(session_cookie(ACCESS_COOKIE, pair.access_token.clone(), secure))
        .add(session_cookie(REFRESH_COOKIE, pair.refresh_token.clone(), secure))
}

fn without_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let user = services::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let (user, pair) = services::login(&state, payload).await?;
    let jar = with_session(jar, &pair, state.config.cookie_secure);
    Ok((
        jar,
        Json(AuthResponse {
            user: PublicUser::from(user),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }),
    ))
}

/// The cookie wins over the body, which mobile clients use instead.
#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Option<Json<RefreshRequest>>,
) -> AppResult<(CookieJar, Json<TokenPair>)> {
    let incoming = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| payload.and_then(|Json(body)| body.refresh_token));

    let pair = services::refresh(&state, incoming).await?;
    let jar = with_session(jar, &pair, state.config.cookie_secure);
    Ok((jar, Json(pair)))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    services::logout(&state, user.id).await?;
    Ok((without_session(jar), Json(MessageResponse::ok("User logged out"))))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    services::change_password(&state, &user, payload).await?;
    Ok(Json(MessageResponse::ok("Password changed successfully")))
}

pub async fn current_user(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_details(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateDetailsRequest>,
) -> AppResult<Json<PublicUser>> {
    let updated = services::update_details(&state, user.id, payload).await?;
    Ok(Json(PublicUser::from(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookies_are_http_only() {
        let pair = TokenPair {
            access_token: "a".into(),
            refresh_token: "r".into(),
        };
        let jar = with_session(CookieJar::new(), &pair, true);
        let access = jar.get(ACCESS_COOKIE).unwrap();
        assert_eq!(access.value(), "a");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(jar.get(REFRESH_COOKIE).unwrap().value(), "r");

        let cleared = without_session(jar);
        assert!(cleared.get(ACCESS_COOKIE).is_none());
        assert!(cleared.get(REFRESH_COOKIE).is_none());
    }

    #[test]
    fn public_user_serialization_has_no_secrets() {
        let user = crate::testing::sample_user("ravi", crate::auth::repo_types::Role::Vendor, "Ranchi", "Jharkhand");
        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(json.contains("\"fullName\""));
        assert!(!json.contains("password"));
        assert!(!json.contains("refresh"));
    }
}
