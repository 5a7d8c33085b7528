// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Channel profile aggregation over the subscription graph.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{ChannelProfile, SubscriptionEdge, User};

/// Computes channel profile views: public user fields joined with
/// subscriber/following counts and the viewer relationship.
#[derive(Clone)]
pub struct ChannelService {
    db: FirestoreDb,
}

impl ChannelService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Build the profile view for a channel, looked up by userName.
    ///
    /// The subscriber edge set is fetched once; both the subscriber
    /// count and the viewer's `is_subscribed` flag are derived from that
    /// single snapshot, so a concurrent subscribe/unsubscribe by the
    /// viewer cannot make the two disagree.
    pub async fn channel_profile(
        &self,
        target_user_name: &str,
        viewer_id: Option<&str>,
    ) -> Result<ChannelProfile, AppError> {
        let target = self
            .db
            .find_user_by_user_name(target_user_name)
            .await?
            .ok_or_else(|| AppError::NotFound("Channel not found".to_string()))?;

        let subscriber_edges = self.db.get_subscribers_of(&target.id).await?;
        let following_count = self.db.get_subscriptions_of(&target.id).await?.len();

        Ok(assemble_profile(
            &target,
            &subscriber_edges,
            following_count,
            viewer_id,
        ))
    }
}

/// Join a target user with one snapshot of its subscriber edges.
fn assemble_profile(
    target: &User,
    subscriber_edges: &[SubscriptionEdge],
    following_count: usize,
    viewer_id: Option<&str>,
) -> ChannelProfile {
    let is_subscribed = viewer_id
        .map(|viewer| subscriber_edges.iter().any(|e| e.subscriber == viewer))
        .unwrap_or(false);

    ChannelProfile {
        user_name: target.user_name.clone(),
        full_name: target.full_name.clone(),
        avatar_url: target.avatar_url.clone(),
        cover_image_url: target.cover_image_url.clone(),
        subscribers_count: subscriber_edges.len(),
        channels_subscribed_to_count: following_count,
        is_subscribed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_user() -> User {
        User {
            id: "u1".to_string(),
            user_name: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            full_name: "Alice".to_string(),
            avatar_url: "https://media/a.png".to_string(),
            cover_image_url: Some("https://media/c.png".to_string()),
            refresh_token: "stored.refresh.token".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn edge(subscriber: &str, channel: &str) -> SubscriptionEdge {
        SubscriptionEdge {
            subscriber: subscriber.to_string(),
            channel: channel.to_string(),
            created_at: "2026-01-02T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_empty_graph_yields_zero_counts() {
        let profile = assemble_profile(&channel_user(), &[], 0, Some("viewer"));

        assert_eq!(profile.subscribers_count, 0);
        assert_eq!(profile.channels_subscribed_to_count, 0);
        assert!(!profile.is_subscribed);
    }

    #[test]
    fn test_viewer_subscription_detected() {
        let edges = vec![edge("u2", "u1"), edge("u3", "u1")];
        let profile = assemble_profile(&channel_user(), &edges, 5, Some("u2"));

        assert_eq!(profile.subscribers_count, 2);
        assert_eq!(profile.channels_subscribed_to_count, 5);
        assert!(profile.is_subscribed);
    }

    #[test]
    fn test_anonymous_viewer_never_subscribed() {
        let edges = vec![edge("u2", "u1")];
        let profile = assemble_profile(&channel_user(), &edges, 0, None);

        assert_eq!(profile.subscribers_count, 1);
        assert!(!profile.is_subscribed);
    }

    #[test]
    fn test_non_subscriber_viewer() {
        let edges = vec![edge("u2", "u1")];
        let profile = assemble_profile(&channel_user(), &edges, 0, Some("u4"));
        assert!(!profile.is_subscribed);
    }

    #[test]
    fn test_profile_exposes_only_public_fields() {
        let profile = assemble_profile(&channel_user(), &[], 0, None);
        let json = serde_json::to_value(&profile).unwrap();

        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token").is_none());
        assert!(json.get("email").is_none());
        assert_eq!(json["user_name"], "alice");
    }
}
