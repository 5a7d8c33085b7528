// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Channel profile routes.

use crate::error::Result;
use crate::middleware::auth::CurrentUser;
use crate::models::ChannelProfile;
use crate::routes::ApiResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;

/// Channel routes (optional auth applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/channels/{user_name}", get(get_channel_profile))
}

/// Channel profile by userName. Anonymous viewers get
/// `is_subscribed: false`; authenticated viewers get their own
/// relationship to the channel.
async fn get_channel_profile(
    State(state): State<Arc<AppState>>,
    Path(user_name): Path<String>,
    viewer: Option<Extension<CurrentUser>>,
) -> Result<Json<ApiResponse<ChannelProfile>>> {
    let viewer_id = viewer.as_ref().map(|Extension(v)| v.0.id.as_str());

    let profile = state
        .channels
        .channel_profile(&user_name, viewer_id)
        .await?;

    Ok(ApiResponse::ok("Channel profile fetched successfully", profile))
}
