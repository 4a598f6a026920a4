// SPDX-License-Identifier: MIT

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ANIMALS: &str = "animals";
    pub const WALKS: &str = "walks";
    pub const ACTIVITIES: &str = "activities";
    pub const ADOPTION_REQUESTS: &str = "adoption_requests";
    /// User walk-stats aggregates (keyed by user_id)
    pub const USER_STATS: &str = "user_stats";
}
