// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (registration, lookup by id / userName / email)
//! - Narrow partial updates (refresh-token slot, password hash)
//! - Subscription edges (graph queries for the channel profile view)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{SubscriptionEdge, User};
use serde::{Deserialize, Serialize};

/// Profile fields for a narrow partial update. `None` fields are left
/// untouched in the stored document.
#[derive(Debug, Default)]
pub struct ProfileFields {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their id.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email address.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Find a user by their case-normalized (lowercase) userName.
    pub async fn find_user_by_user_name(&self, user_name: &str) -> Result<Option<User>, AppError> {
        let user_name = user_name.to_lowercase();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("user_name").eq(user_name.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Create a new user document. Fails if the document already exists.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Narrow Partial Updates ──────────────────────────────────
    //
    // Session and password mutations touch only their own fields; a full
    // document write here could resurrect a concurrently rotated refresh
    // token or clobber an unrelated profile edit.

    /// Overwrite the single refresh-token slot for a user.
    ///
    /// An empty string means "no valid refresh token" (logged out).
    /// Last writer wins: overwriting invalidates any prior token.
    pub async fn set_refresh_token(
        &self,
        user_id: &str,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        #[derive(Serialize, Deserialize)]
        struct RefreshTokenSlot {
            refresh_token: String,
            updated_at: String,
        }

        let slot = RefreshTokenSlot {
            refresh_token: refresh_token.to_string(),
            updated_at: now_rfc3339(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(["refresh_token", "updated_at"])
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(&slot)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Replace the stored password hash for a user.
    pub async fn set_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<(), AppError> {
        #[derive(Serialize, Deserialize)]
        struct PasswordSlot {
            password_hash: String,
            updated_at: String,
        }

        let slot = PasswordSlot {
            password_hash: password_hash.to_string(),
            updated_at: now_rfc3339(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(["password_hash", "updated_at"])
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(&slot)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Update a subset of profile fields (full_name, email, avatar_url,
    /// cover_image_url). Only the provided fields are written.
    pub async fn update_profile_fields(
        &self,
        user_id: &str,
        fields: &ProfileFields,
    ) -> Result<(), AppError> {
        let mut doc = serde_json::Map::new();
        let mut paths: Vec<&str> = vec!["updated_at"];
        doc.insert("updated_at".to_string(), serde_json::json!(now_rfc3339()));

        if let Some(full_name) = &fields.full_name {
            doc.insert("full_name".to_string(), serde_json::json!(full_name));
            paths.push("full_name");
        }
        if let Some(email) = &fields.email {
            doc.insert("email".to_string(), serde_json::json!(email));
            paths.push("email");
        }
        if let Some(avatar_url) = &fields.avatar_url {
            doc.insert("avatar_url".to_string(), serde_json::json!(avatar_url));
            paths.push("avatar_url");
        }
        if let Some(cover_image_url) = &fields.cover_image_url {
            doc.insert(
                "cover_image_url".to_string(),
                serde_json::json!(cover_image_url),
            );
            paths.push("cover_image_url");
        }

        let doc = serde_json::Value::Object(doc);

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths)
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Subscription Graph Operations ───────────────────────────

    /// Fetch all edges pointing at a channel, in one read.
    ///
    /// The caller derives both the subscriber count and the viewer
    /// relationship from this single snapshot, so the two can never
    /// disagree about a concurrently written edge.
    pub async fn get_subscribers_of(
        &self,
        channel_id: &str,
    ) -> Result<Vec<SubscriptionEdge>, AppError> {
        let channel_id = channel_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SUBSCRIPTIONS)
            .filter(move |q| q.field("channel").eq(channel_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch all edges originating from a subscriber.
    pub async fn get_subscriptions_of(
        &self,
        subscriber_id: &str,
    ) -> Result<Vec<SubscriptionEdge>, AppError> {
        let subscriber_id = subscriber_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SUBSCRIPTIONS)
            .filter(move |q| q.field("subscriber").eq(subscriber_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a subscription edge (upsert; the doc id makes the pair unique).
    pub async fn set_subscription(&self, edge: &SubscriptionEdge) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SUBSCRIPTIONS)
            .document_id(edge.doc_id())
            .object(edge)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove a subscription edge.
    pub async fn delete_subscription(
        &self,
        subscriber_id: &str,
        channel_id: &str,
    ) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SUBSCRIPTIONS)
            .document_id(format!("{}_{}", subscriber_id, channel_id))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Current time as RFC 3339 with a `Z` suffix.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
