// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod channel;
pub mod subscription;
pub mod user;

pub use channel::ChannelProfile;
pub use subscription::SubscriptionEdge;
pub use user::{PublicUser, User};
