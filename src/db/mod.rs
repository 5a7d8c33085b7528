// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Subscription edges (subscriber -> channel), keyed by "{subscriber}_{channel}"
    pub const SUBSCRIPTIONS: &str = "subscriptions";
}
