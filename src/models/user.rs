// SPDX-License-Identifier: MIT

//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Identity-provider subject (also used as document ID)
    pub user_id: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Display name shown in the community feed
    pub display_name: String,
    /// Profile picture URL
    pub profile_picture: Option<String>,
    /// "user" or "shelter"
    pub role: String,
    /// When the user first signed in
    pub created_at: String,
    /// Last activity timestamp
    pub last_active: String,
}
