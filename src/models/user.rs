// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User record stored in Firestore.
///
/// `password_hash` and `refresh_token` never leave the storage layer
/// unstripped; everything that crosses the API boundary is a
/// [`PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque unique id (UUID v4, also used as document ID)
    pub id: String,
    /// Unique handle, stored lowercase
    pub user_name: String,
    /// Unique email address
    pub email: String,
    /// Argon2id hash in PHC string format
    pub password_hash: String,
    /// Display name
    pub full_name: String,
    /// Avatar URL in the media store (mandatory)
    pub avatar_url: String,
    /// Cover image URL (optional)
    pub cover_image_url: Option<String>,
    /// Currently valid refresh token; empty when logged out.
    /// At most one value is valid at a time.
    pub refresh_token: String,
    /// When the user registered (RFC 3339)
    pub created_at: String,
    /// Last mutation timestamp (RFC 3339)
    pub updated_at: String,
}

impl User {
    /// Sanitized view with credential and session fields stripped.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            user_name: self.user_name.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            avatar_url: self.avatar_url.clone(),
            cover_image_url: self.cover_image_url.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// User view safe to return to callers (no password hash, no tokens).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub created_at: String,
}
