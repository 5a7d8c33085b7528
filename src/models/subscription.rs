// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Subscription edge model: "subscriber follows channel".

use serde::{Deserialize, Serialize};

/// Directed subscription edge stored in Firestore.
///
/// Document ID is `"{subscriber}_{channel}"`, so the pair is naturally
/// unique. Many-to-many: a user may appear on either side of any number
/// of edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEdge {
    /// User who follows
    pub subscriber: String,
    /// Channel (user) being followed
    pub channel: String,
    /// When the edge was created (RFC 3339)
    pub created_at: String,
}

impl SubscriptionEdge {
    /// Document ID for this edge.
    pub fn doc_id(&self) -> String {
        format!("{}_{}", self.subscriber, self.channel)
    }
}
