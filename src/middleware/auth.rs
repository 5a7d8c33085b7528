// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access-token authentication middleware.
//!
//! Verification is read-only: the middleware never mutates token state.
//! The decoded user id is resolved against the credential store on every
//! request, so a token for a deleted user is rejected even while its
//! signature is still valid.

use crate::error::AppError;
use crate::models::PublicUser;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Authenticated identity attached to the request, with credential and
/// session fields already stripped.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub PublicUser);

/// Middleware that requires a valid access token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&jar, &request)
        .ok_or_else(|| AppError::Unauthorized("Access token not found".to_string()))?;

    let user = resolve_user(&state, &token).await?;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Middleware that attaches the viewer identity when a valid access
/// token is present and continues anonymously otherwise.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(&jar, &request) {
        if let Ok(user) = resolve_user(&state, &token).await {
            request.extensions_mut().insert(CurrentUser(user));
        }
    }

    next.run(request).await
}

/// Try the `accessToken` cookie first, then the Authorization header.
fn extract_token(jar: &CookieJar, request: &Request) -> Option<String> {
    if let Some(cookie) = jar.get("accessToken") {
        return Some(cookie.value().to_string());
    }

    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

async fn resolve_user(state: &Arc<AppState>, token: &str) -> Result<PublicUser, AppError> {
    let claims = state.tokens.verify_access(token)?;

    let user = state
        .db
        .get_user(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    Ok(user.public())
}
