// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Vidstream: channel-based video platform backend
//!
//! This crate provides the user/session API: credential verification,
//! the dual-token (access/refresh) session lifecycle, and the
//! subscription-graph aggregation behind channel profile views.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{ChannelService, SessionService, TokenService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub tokens: TokenService,
    pub sessions: SessionService,
    pub channels: ChannelService,
}
