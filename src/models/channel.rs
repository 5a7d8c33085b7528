// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Channel profile aggregate returned by the profile view.

use serde::{Deserialize, Serialize};

/// Public channel profile: the target user's public fields joined with
/// counts derived from the subscription graph and the viewer's own
/// relationship to the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelProfile {
    pub user_name: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    /// Number of edges pointing at this channel
    pub subscribers_count: usize,
    /// Number of channels this user follows
    pub channels_subscribed_to_count: usize,
    /// Whether the viewer follows this channel (false for anonymous)
    pub is_subscribed: bool,
}
