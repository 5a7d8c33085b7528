// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User and session routes.
//!
//! Tokens travel both in the response body and as `httpOnly`/`secure`
//! cookies; the refresh endpoint additionally accepts the token from
//! the request body as a cookie fallback.

use crate::error::Result;
use crate::middleware::auth::CurrentUser;
use crate::models::PublicUser;
use crate::routes::ApiResponse;
use crate::services::session::NewUser;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ACCESS_COOKIE: &str = "accessToken";
const REFRESH_COOKIE: &str = "refreshToken";

/// Public session routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/refresh-token", post(refresh_token))
}

/// Routes requiring a valid access token (middleware applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/logout", post(logout))
        .route("/api/users/change-password", post(change_password))
        .route("/api/users/me", get(get_me).patch(update_me))
        .route("/api/users/avatar", patch(update_avatar))
        .route("/api/users/cover-image", patch(update_cover_image))
}

// ─── Cookies ─────────────────────────────────────────────────

fn auth_cookie(name: &'static str, value: String, max_age: time::Duration) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(max_age);
    cookie
}

/// Add both token cookies with lifetimes matching the token TTLs.
fn with_token_cookies(
    jar: CookieJar,
    state: &AppState,
    access_token: &str,
    refresh_token: &str,
) -> CookieJar {
    jar.add(auth_cookie(
        ACCESS_COOKIE,
        access_token.to_string(),
        time::Duration::minutes(state.config.access_token_ttl_minutes),
    ))
    .add(auth_cookie(
        REFRESH_COOKIE,
        refresh_token.to_string(),
        time::Duration::days(state.config.refresh_token_ttl_days),
    ))
}

/// Expire both token cookies with attributes matching their creation.
fn without_token_cookies(jar: CookieJar) -> CookieJar {
    jar.add(auth_cookie(ACCESS_COOKIE, String::new(), time::Duration::ZERO))
        .add(auth_cookie(
            REFRESH_COOKIE,
            String::new(),
            time::Duration::ZERO,
        ))
}

// ─── Registration / Login ────────────────────────────────────

/// Register a new user.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<PublicUser>>)> {
    let user = state.sessions.register(&payload).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("User registered successfully", user),
    ))
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Serialize)]
struct LoginData {
    user: PublicUser,
    access_token: String,
    refresh_token: String,
}

/// Log in with email and password.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginData>>)> {
    let outcome = state
        .sessions
        .login(payload.email.as_deref(), payload.password.as_deref())
        .await?;

    let jar = with_token_cookies(
        jar,
        &state,
        &outcome.tokens.access_token,
        &outcome.tokens.refresh_token,
    );

    Ok((
        jar,
        ApiResponse::ok(
            "User logged in successfully",
            LoginData {
                user: outcome.user,
                access_token: outcome.tokens.access_token,
                refresh_token: outcome.tokens.refresh_token,
            },
        ),
    ))
}

/// Log out: clears the server-side refresh-token slot and both cookies.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<()>>)> {
    state.sessions.logout(&user.0.id).await?;

    Ok((
        without_token_cookies(jar),
        ApiResponse::message_only("User logged out successfully"),
    ))
}

// ─── Token Rotation ──────────────────────────────────────────

#[derive(Deserialize)]
struct RefreshRequest {
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Serialize)]
struct RefreshData {
    access_token: String,
    refresh_token: String,
}

/// Exchange a refresh token (cookie, or request body as a fallback)
/// for a new token pair. A missing or non-JSON body is fine when the
/// cookie is present.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    payload: std::result::Result<Json<RefreshRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<(CookieJar, Json<ApiResponse<RefreshData>>)> {
    let from_cookie = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    let from_body = payload.ok().and_then(|Json(p)| p.refresh_token);
    let presented = from_cookie.or(from_body);

    let tokens = state.sessions.rotate(presented.as_deref()).await?;

    let jar = with_token_cookies(jar, &state, &tokens.access_token, &tokens.refresh_token);

    Ok((
        jar,
        ApiResponse::ok(
            "Access token refreshed",
            RefreshData {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
        ),
    ))
}

// ─── Account Management ──────────────────────────────────────

#[derive(Deserialize)]
struct ChangePasswordRequest {
    #[serde(default)]
    old_password: Option<String>,
    #[serde(default)]
    new_password: Option<String>,
    #[serde(default)]
    confirm_password: Option<String>,
}

/// Change the current user's password. The active session survives.
async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>> {
    state
        .sessions
        .change_password(
            &user.0.id,
            payload.old_password.as_deref(),
            payload.new_password.as_deref(),
            payload.confirm_password.as_deref(),
        )
        .await?;

    Ok(ApiResponse::message_only("Password changed successfully"))
}

/// Get the current user (as resolved by the auth middleware).
async fn get_me(
    Extension(user): Extension<CurrentUser>,
) -> Json<ApiResponse<PublicUser>> {
    ApiResponse::ok("Current user fetched successfully", user.0)
}

#[derive(Deserialize)]
struct UpdateProfileRequest {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Update profile fields (full name and/or email).
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<PublicUser>>> {
    let updated = state
        .sessions
        .update_profile(
            &user.0.id,
            payload.full_name.as_deref(),
            payload.email.as_deref(),
        )
        .await?;

    Ok(ApiResponse::ok("Profile updated successfully", updated))
}

#[derive(Deserialize)]
struct UpdateImageRequest {
    /// Local path of the uploaded file handed over by the upload chain.
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    cover_image: Option<String>,
}

/// Replace the current user's avatar.
async fn update_avatar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<UpdateImageRequest>,
) -> Result<Json<ApiResponse<PublicUser>>> {
    let updated = state
        .sessions
        .update_avatar(&user.0.id, payload.avatar.as_deref())
        .await?;

    Ok(ApiResponse::ok("Avatar updated successfully", updated))
}

/// Replace the current user's cover image.
async fn update_cover_image(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<UpdateImageRequest>,
) -> Result<Json<ApiResponse<PublicUser>>> {
    let updated = state
        .sessions
        .update_cover_image(&user.0.id, payload.cover_image.as_deref())
        .await?;

    Ok(ApiResponse::ok("Cover image updated successfully", updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::FirestoreDb;
    use crate::services::{ChannelService, MediaService, SessionService, TokenService};

    fn test_state() -> AppState {
        let config = Config::test_default();
        let db = FirestoreDb::new_mock();
        let tokens = TokenService::new(&config);
        let sessions = SessionService::new(db.clone(), tokens.clone(), MediaService::new_mock());
        let channels = ChannelService::new(db.clone());
        AppState {
            config,
            db,
            tokens,
            sessions,
            channels,
        }
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = auth_cookie(ACCESS_COOKIE, "tok".to_string(), time::Duration::minutes(15));

        assert_eq!(cookie.name(), "accessToken");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::minutes(15)));
    }

    #[test]
    fn test_token_cookies_track_configured_ttls() {
        let state = test_state();
        let jar = with_token_cookies(CookieJar::new(), &state, "access", "refresh");

        let access = jar.get(ACCESS_COOKIE).unwrap();
        let refresh = jar.get(REFRESH_COOKIE).unwrap();
        assert_eq!(access.value(), "access");
        assert_eq!(refresh.value(), "refresh");
        assert_eq!(
            access.max_age(),
            Some(time::Duration::minutes(
                state.config.access_token_ttl_minutes
            ))
        );
        assert_eq!(
            refresh.max_age(),
            Some(time::Duration::days(state.config.refresh_token_ttl_days))
        );
    }

    #[test]
    fn test_removal_cookies_expire_immediately() {
        let jar = without_token_cookies(CookieJar::new());

        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            let cookie = jar.get(name).unwrap();
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
            assert_eq!(cookie.http_only(), Some(true));
        }
    }
}
