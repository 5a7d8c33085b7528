// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Media store client for avatar and cover image uploads.
//!
//! The media store is an opaque external collaborator: it takes file
//! bytes and answers with the public URL of the stored object. There is
//! no retry here; a failed upload is terminal for the calling operation.

use crate::error::AppError;
use serde::Deserialize;

/// Result of a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedMedia {
    pub url: String,
}

/// Media store upload service.
#[derive(Clone)]
pub struct MediaService {
    upload_url: String,
    client: Option<reqwest::Client>,
}

impl MediaService {
    /// Create a new media service pointing at the configured store.
    pub fn new(upload_url: &str) -> Self {
        Self {
            upload_url: upload_url.to_string(),
            client: Some(reqwest::Client::new()),
        }
    }

    /// Create a mock media service for testing (offline mode).
    /// Only available in debug/test builds.
    #[cfg(debug_assertions)]
    pub fn new_mock() -> Self {
        Self {
            upload_url: "mock://media".to_string(),
            client: None,
        }
    }

    /// Upload a local file to the media store and return its public URL.
    pub async fn upload(&self, local_path: &str) -> Result<UploadedMedia, AppError> {
        // Mock mode (debug builds only): deterministic URL without I/O.
        // A "fail://" path simulates a store failure so callers' error
        // paths stay testable.
        #[cfg(debug_assertions)]
        {
            if self.client.is_none() {
                if let Some(name) = local_path.strip_prefix("fail://") {
                    return Err(AppError::Dependency(format!(
                        "Media store rejected {}",
                        name
                    )));
                }
                let file_name = local_path.rsplit('/').next().unwrap_or(local_path);
                return Ok(UploadedMedia {
                    url: format!("{}/{}", self.upload_url, file_name),
                });
            }
        }

        let client = self.client.as_ref().ok_or_else(|| {
            AppError::Dependency("Media store client not configured".to_string())
        })?;

        let bytes = tokio::fs::read(local_path).await.map_err(|e| {
            AppError::Dependency(format!("Failed to read upload source {}: {}", local_path, e))
        })?;

        let response = client
            .post(&self.upload_url)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Dependency(format!("Media store request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Dependency(format!(
                "Media store answered {}",
                response.status()
            )));
        }

        response
            .json::<UploadedMedia>()
            .await
            .map_err(|e| AppError::Dependency(format!("Malformed media store response: {}", e)))
    }
}
