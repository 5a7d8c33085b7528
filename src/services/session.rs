// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: registration, login, logout, token rotation and
//! password changes.
//!
//! Session state per user is tracked solely through the refresh-token
//! slot on the user record: empty means anonymous, non-empty means
//! authenticated. Every issuance overwrites the slot, so at most one
//! refresh token is valid per user at any time.

use crate::db::{firestore::now_rfc3339, FirestoreDb};
use crate::error::AppError;
use crate::models::{PublicUser, User};
use crate::services::media::MediaService;
use crate::services::password::{hash_password, verify_password};
use crate::services::tokens::{TokenPair, TokenService};
use serde::Deserialize;
use validator::Validate;

/// Registration input. Required fields are validated here, not at the
/// deserialization boundary, so a missing field surfaces as the API's
/// own validation error.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct NewUser {
    #[serde(default)]
    #[validate(length(min = 2, max = 40))]
    pub user_name: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Local path of the avatar file handed over by the upload
    /// collaborator chain. Mandatory.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Local path of the optional cover image file.
    #[serde(default)]
    pub cover_image: Option<String>,
}

/// Successful login: the sanitized user plus the freshly minted pair.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: PublicUser,
    pub tokens: TokenPair,
}

/// Session manager orchestrating the credential store, token issuer and
/// media collaborator.
#[derive(Clone)]
pub struct SessionService {
    db: FirestoreDb,
    tokens: TokenService,
    media: MediaService,
}

impl SessionService {
    pub fn new(db: FirestoreDb, tokens: TokenService, media: MediaService) -> Self {
        Self { db, tokens, media }
    }

    /// Register a new user.
    ///
    /// The avatar upload happens before any user document is written:
    /// a missing avatar or a failed upload is terminal and leaves no
    /// partial user behind.
    pub async fn register(&self, input: &NewUser) -> Result<PublicUser, AppError> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user_name = require(input.user_name.as_deref(), "userName")?.to_lowercase();
        let email = require(input.email.as_deref(), "email")?;
        let password = require(input.password.as_deref(), "password")?;
        let full_name = require(input.full_name.as_deref(), "fullName")?;
        let avatar_path = require(input.avatar.as_deref(), "avatar")?;

        if self.db.find_user_by_user_name(&user_name).await?.is_some() {
            return Err(AppError::Conflict("userName is already taken".to_string()));
        }
        if self.db.find_user_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("email is already registered".to_string()));
        }

        let avatar = self.media.upload(avatar_path).await?;

        // A failed cover upload is not terminal: the field is optional
        // and the original behavior degrades to "no cover image".
        let cover_image_url = match input.cover_image.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => match self.media.upload(path).await {
                Ok(uploaded) => Some(uploaded.url),
                Err(e) => {
                    tracing::warn!(error = %e, "Cover image upload failed, continuing without");
                    None
                }
            },
            None => None,
        };

        let password_hash = hash_password(password)?;
        let now = now_rfc3339();

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            user_name,
            email: email.to_string(),
            password_hash,
            full_name: full_name.to_string(),
            avatar_url: avatar.url,
            cover_image_url,
            refresh_token: String::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.db.create_user(&user).await?;

        tracing::info!(user_id = %user.id, user_name = %user.user_name, "User registered");

        Ok(user.public())
    }

    /// Log a user in with email and password.
    ///
    /// On success the refresh-token slot is overwritten before anything
    /// is returned: either the stored slot and the returned pair match,
    /// or the login as a whole fails.
    pub async fn login(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<LoginOutcome, AppError> {
        let email = require(email, "email")?;
        let password = require(password, "password")?;

        let user = self
            .db
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify_password(&user.password_hash, password) {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let tokens = self.tokens.issue_pair(&user.id)?;
        self.db
            .set_refresh_token(&user.id, &tokens.refresh_token)
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            user: user.public(),
            tokens,
        })
    }

    /// Log a user out by clearing the refresh-token slot.
    ///
    /// Idempotent: logging out an already-anonymous user succeeds.
    pub async fn logout(&self, user_id: &str) -> Result<(), AppError> {
        self.db.set_refresh_token(user_id, "").await?;
        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Exchange a valid refresh token for a new access/refresh pair.
    ///
    /// The presented token must both verify and equal the stored slot;
    /// the equality check is what defeats replay of a superseded token.
    /// Concurrent rotations from the same stale token race on the slot
    /// overwrite and at most one wins.
    pub async fn rotate(&self, presented: Option<&str>) -> Result<TokenPair, AppError> {
        let presented = presented
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::Unauthorized("Refresh token not found".to_string()))?;

        let claims = self.tokens.verify_refresh(presented)?;

        let user = self
            .db
            .get_user(&claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if user.refresh_token != presented {
            return Err(AppError::Unauthorized(
                "Refresh token is no longer valid".to_string(),
            ));
        }

        let tokens = self.tokens.issue_pair(&user.id)?;
        self.db
            .set_refresh_token(&user.id, &tokens.refresh_token)
            .await?;

        tracing::debug!(user_id = %user.id, "Refresh token rotated");

        Ok(tokens)
    }

    /// Change a user's password.
    ///
    /// The existing refresh token is deliberately left in place: the
    /// session survives a password change.
    pub async fn change_password(
        &self,
        user_id: &str,
        old_password: Option<&str>,
        new_password: Option<&str>,
        confirm_password: Option<&str>,
    ) -> Result<(), AppError> {
        let old_password = require(old_password, "oldPassword")?;
        let new_password = require(new_password, "newPassword")?;
        let confirm_password = require(confirm_password, "confirmPassword")?;

        if new_password != confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }

        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !verify_password(&user.password_hash, old_password) {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let password_hash = hash_password(new_password)?;
        self.db.set_password_hash(user_id, &password_hash).await?;

        tracing::info!(user_id = %user_id, "Password changed");

        Ok(())
    }

    /// Update full name and/or email. At least one field is required.
    pub async fn update_profile(
        &self,
        user_id: &str,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<PublicUser, AppError> {
        let full_name = full_name.map(str::trim).filter(|s| !s.is_empty());
        let email = email.map(str::trim).filter(|s| !s.is_empty());

        if full_name.is_none() && email.is_none() {
            return Err(AppError::Validation(
                "At least one of fullName or email is required".to_string(),
            ));
        }

        if let Some(new_email) = email {
            if let Some(existing) = self.db.find_user_by_email(new_email).await? {
                if existing.id != user_id {
                    return Err(AppError::Conflict(
                        "email is already registered".to_string(),
                    ));
                }
            }
        }

        let fields = crate::db::firestore::ProfileFields {
            full_name: full_name.map(str::to_string),
            email: email.map(str::to_string),
            ..Default::default()
        };
        self.db.update_profile_fields(user_id, &fields).await?;

        self.fetch_public(user_id).await
    }

    /// Replace the user's avatar. A failed upload is terminal; the old
    /// avatar stays in place.
    pub async fn update_avatar(
        &self,
        user_id: &str,
        avatar_path: Option<&str>,
    ) -> Result<PublicUser, AppError> {
        let avatar_path = require(avatar_path, "avatar")?;
        let uploaded = self.media.upload(avatar_path).await?;

        let fields = crate::db::firestore::ProfileFields {
            avatar_url: Some(uploaded.url),
            ..Default::default()
        };
        self.db.update_profile_fields(user_id, &fields).await?;

        self.fetch_public(user_id).await
    }

    /// Replace the user's cover image.
    pub async fn update_cover_image(
        &self,
        user_id: &str,
        cover_image_path: Option<&str>,
    ) -> Result<PublicUser, AppError> {
        let cover_image_path = require(cover_image_path, "coverImage")?;
        let uploaded = self.media.upload(cover_image_path).await?;

        let fields = crate::db::firestore::ProfileFields {
            cover_image_url: Some(uploaded.url),
            ..Default::default()
        };
        self.db.update_profile_fields(user_id, &fields).await?;

        self.fetch_public(user_id).await
    }

    async fn fetch_public(&self, user_id: &str) -> Result<PublicUser, AppError> {
        self.db
            .get_user(user_id)
            .await?
            .map(|u| u.public())
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

/// Require a non-empty input field.
fn require<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_missing_and_blank() {
        assert!(require(None, "email").is_err());
        assert!(require(Some(""), "email").is_err());
        assert!(require(Some("   "), "email").is_err());
        assert_eq!(require(Some(" a@x.com "), "email").unwrap(), "a@x.com");
    }
}
