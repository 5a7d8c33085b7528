// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access/refresh token issuance and verification.
//!
//! Both token kinds are self-contained HS256 JWTs carrying
//! `{sub, iat, exp}`; each kind has its own signing secret and TTL, so
//! a refresh token can never pass as an access token or vice versa.
//! Verification failure is reported uniformly: callers cannot tell a bad
//! signature from an expired token.

use crate::config::Config;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token issuer and verifier.
#[derive(Clone)]
pub struct TokenService {
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        Self {
            access_secret: config.access_token_secret.clone(),
            refresh_secret: config.refresh_token_secret.clone(),
            access_ttl: chrono::Duration::minutes(config.access_token_ttl_minutes),
            refresh_ttl: chrono::Duration::days(config.refresh_token_ttl_days),
        }
    }

    /// Mint a short-lived access token for a user.
    pub fn issue_access(&self, user_id: &str) -> Result<String, AppError> {
        issue(user_id, &self.access_secret, self.access_ttl)
    }

    /// Mint a long-lived refresh token for a user.
    pub fn issue_refresh(&self, user_id: &str) -> Result<String, AppError> {
        issue(user_id, &self.refresh_secret, self.refresh_ttl)
    }

    /// Mint both tokens. Either both succeed or the whole call fails.
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue_access(user_id)?,
            refresh_token: self.issue_refresh(user_id)?,
        })
    }

    /// Verify an access token's signature and expiry.
    pub fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        verify(token, &self.access_secret)
    }

    /// Verify a refresh token's signature and expiry.
    ///
    /// Equality against the stored per-user slot is the session
    /// manager's job; this only checks the token itself.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AppError> {
        verify(token, &self.refresh_secret)
    }
}

fn issue(user_id: &str, secret: &[u8], ttl: chrono::Duration) -> Result<String, AppError> {
    let now = chrono::Utc::now();

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Token signing failed: {}", e)))
}

fn verify(token: &str, secret: &[u8]) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(secret);
    let validation = Validation::new(Algorithm::HS256);

    // Signature and expiry failures collapse into the same error.
    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}
