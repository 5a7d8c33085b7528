// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Token secrets and TTLs are configuration, never hard-coded: the
//! access and refresh tokens are signed with distinct secrets and
//! carry distinct lifetimes.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Media store upload endpoint (avatar / cover image collaborator)
    pub media_upload_url: String,
    /// Access token lifetime in minutes
    pub access_token_ttl_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,

    // --- Secrets ---
    /// Signing key for short-lived access tokens (raw bytes)
    pub access_token_secret: Vec<u8>,
    /// Signing key for long-lived refresh tokens (raw bytes)
    pub refresh_token_secret: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In production the secrets are injected as environment variables
    /// by the deployment platform; locally a `.env` file works.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            media_upload_url: env::var("MEDIA_UPLOAD_URL")
                .map_err(|_| ConfigError::Missing("MEDIA_UPLOAD_URL"))?,
            access_token_ttl_minutes: env::var("ACCESS_TOKEN_TTL_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_TTL_MINUTES"))?,
            refresh_token_ttl_days: env::var("REFRESH_TOKEN_TTL_DAYS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("REFRESH_TOKEN_TTL_DAYS"))?,
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .map_err(|_| ConfigError::Missing("ACCESS_TOKEN_SECRET"))?
                .into_bytes(),
            refresh_token_secret: env::var("REFRESH_TOKEN_SECRET")
                .map_err(|_| ConfigError::Missing("REFRESH_TOKEN_SECRET"))?
                .into_bytes(),
        })
    }

    /// Config for tests only. The two token secrets differ so that tests
    /// catch any access/refresh secret mix-up.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            media_upload_url: "http://localhost:9000/upload".to_string(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 10,
            access_token_secret: b"test_access_secret_32_bytes_min!".to_vec(),
            refresh_token_secret: b"test_refresh_secret_32_bytes_ok!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("MEDIA_UPLOAD_URL", "http://localhost:9000/upload");
        env::set_var("ACCESS_TOKEN_SECRET", "test_access_secret_32_bytes_min!");
        env::set_var("REFRESH_TOKEN_SECRET", "test_refresh_secret_32_bytes_ok!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.access_token_ttl_minutes, 15);
        assert_eq!(config.refresh_token_ttl_days, 10);
        assert_ne!(config.access_token_secret, config.refresh_token_secret);
    }
}
