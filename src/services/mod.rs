// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod channel;
pub mod media;
pub mod password;
pub mod session;
pub mod tokens;

pub use channel::ChannelService;
pub use media::{MediaService, UploadedMedia};
pub use session::{LoginOutcome, NewUser, SessionService};
pub use tokens::{Claims, TokenPair, TokenService};
