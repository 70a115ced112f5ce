use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{ChangePasswordRequest, LoginRequest, RegisterRequest, TokenPair, UpdateDetailsRequest},
        password::{hash_password, verify_password},
        repo_types::{Gender, NewUser, ProfileUpdate, Role, User},
    },
    error::{AppError, AppResult},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn internal(e: anyhow::Error) -> AppError {
    AppError::internal(e.to_string())
}

/// Trimmed value, or `None` when missing or blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    non_blank(value).ok_or_else(|| AppError::validation(format!("{field} is required")))
}

fn normalized_email(raw: String) -> AppResult<String> {
    let email = raw.to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email"));
    }
    Ok(email)
}

/// Create an account. The returned record still holds the hash; callers
/// expose it only as a `PublicUser`.
pub async fn register(st: &AppState, req: RegisterRequest) -> AppResult<User> {
    let username = required(req.username, "username")?.to_lowercase();
    let email = required(req.email, "email")?;
    let full_name = required(req.full_name, "fullName")?;
    let password = req
        .password
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::validation("password is required"))?;
    let gender: Gender = required(req.gender, "gender")?
        .parse()
        .map_err(AppError::Validation)?;
    let state = required(req.state, "state")?;
    let city = required(req.city, "city")?;
    let role: Role = required(req.role, "role")?.parse().map_err(AppError::Validation)?;
    let email = normalized_email(email)?;

    if st.users.find_by_username_or_email(&username, &email).await?.is_some() {
        warn!(%username, %email, "registration for existing user");
        return Err(AppError::Duplicate("User already exists".into()));
    }

    let password_hash = hash_password(&password).map_err(internal)?;
    let user = st
        .users
        .create(NewUser {
            username,
            email,
            full_name,
            password_hash,
            gender,
            role,
            state,
            city,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, role = %user.role, "user registered");
    Ok(user)
}

/// Sign a fresh pair for `user` without touching the store.
fn sign_pair(st: &AppState, user: &User) -> AppResult<TokenPair> {
    let access_token = st.jwt.sign_access(user).map_err(internal)?;
    let refresh_token = st.jwt.sign_refresh(user.id).map_err(internal)?;
    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Check credentials and open a session; a previous session of the same
/// user stops being refreshable.
pub async fn login(st: &AppState, req: LoginRequest) -> AppResult<(User, TokenPair)> {
    let username = req.username.trim().to_lowercase();
    if username.is_empty() {
        return Err(AppError::validation("username is required"));
    }

    let user = st.users.find_by_username(&username).await?.ok_or_else(|| {
        warn!(%username, "login for unknown user");
        AppError::not_found("User not found")
    })?;

    if !verify_password(&req.password, &user.password_hash).map_err(internal)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let pair = sign_pair(st, &user)?;
    st.users.set_refresh_token(user.id, Some(&pair.refresh_token)).await?;

    info!(user_id = %user.id, "user logged in");
    Ok((user, pair))
}

/// Exchange a live refresh token for a new pair. The presented token stops
/// being valid in the same write that stores its successor.
pub async fn refresh(st: &AppState, incoming: Option<String>) -> AppResult<TokenPair> {
    let incoming = non_blank(incoming).ok_or_else(|| AppError::unauthorized("Unauthorized request"))?;

    let claims = st.jwt.verify_refresh(&incoming)?;

    let user = st
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

    if user.refresh_token.as_deref() != Some(incoming.as_str()) {
        warn!(user_id = %user.id, "stale refresh token presented");
        return Err(AppError::unauthorized("Refresh token expired or used"));
    }

    let pair = sign_pair(st, &user)?;
    let rotated = st
        .users
        .rotate_refresh_token(user.id, &incoming, &pair.refresh_token)
        .await?;
    if !rotated {
        warn!(user_id = %user.id, "refresh token rotated concurrently");
        return Err(AppError::unauthorized("Refresh token expired or used"));
    }

    info!(user_id = %user.id, "access token refreshed");
    Ok(pair)
}

pub async fn logout(st: &AppState, user_id: Uuid) -> AppResult<()> {
    st.users.set_refresh_token(user_id, None).await?;
    info!(%user_id, "user logged out");
    Ok(())
}

/// Existing sessions survive a password change.
pub async fn change_password(st: &AppState, user: &User, req: ChangePasswordRequest) -> AppResult<()> {
    if req.new_password.trim().is_empty() {
        return Err(AppError::validation("newPassword is required"));
    }
    if !verify_password(&req.old_password, &user.password_hash).map_err(internal)? {
        warn!(user_id = %user.id, "change password with wrong old password");
        return Err(AppError::WrongPassword("Invalid password".into()));
    }

    let hash = hash_password(&req.new_password).map_err(internal)?;
    st.users.set_password_hash(user.id, &hash).await?;
    info!(user_id = %user.id, "password changed");
    Ok(())
}

pub async fn update_details(st: &AppState, user_id: Uuid, req: UpdateDetailsRequest) -> AppResult<User> {
    let update = ProfileUpdate {
        email: non_blank(req.email).map(normalized_email).transpose()?,
        full_name: non_blank(req.full_name),
        state: non_blank(req.state),
        city: non_blank(req.city),
    };
    if update.is_empty() {
        return Err(AppError::validation(
            "At least one field (email, fullName, state or city) is required",
        ));
    }

    if let Some(email) = update.email.as_deref() {
        if let Some(other) = st.users.find_by_email(email).await? {
            if other.id != user_id {
                return Err(AppError::Conflict("Email already registered".into()));
            }
        }
    }

    let user = st
        .users
        .update_profile(user_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    info!(%user_id, "account details updated");
    Ok(user)
}
