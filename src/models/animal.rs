// SPDX-License-Identifier: MIT

//! Animal listing model for storage and API.

use serde::{Deserialize, Serialize};

/// Listing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalStatus {
    /// Visible in browse results, open for adoption requests
    Adoptable,
    /// An adoption request has been approved but handover is pending
    Reserved,
    /// Adopted; only the keeper can schedule activities and walks
    Adopted,
    /// Removed from listings by the shelter
    Archived,
}

impl AnimalStatus {
    /// Stable name matching the serde representation, for query filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalStatus::Adoptable => "adoptable",
            AnimalStatus::Reserved => "reserved",
            AnimalStatus::Adopted => "adopted",
            AnimalStatus::Archived => "archived",
        }
    }
}

/// Animal listing stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    /// Document ID (server-generated UUID)
    pub animal_id: String,
    /// Display name
    pub name: String,
    /// Species (e.g. "dog", "cat")
    pub species: String,
    /// Breed, if known
    pub breed: Option<String>,
    /// Age in months, if known
    pub age_months: Option<u32>,
    /// Free-form description written by the shelter
    pub description: Option<String>,
    /// Owning shelter's user ID
    pub shelter_id: String,
    /// Listing status
    pub status: AnimalStatus,
    /// User holding the adoption / special ownership, once granted
    pub keeper_id: Option<String>,
    /// When the listing was created (RFC3339)
    pub created_at: String,
    /// Last modification timestamp (RFC3339)
    pub updated_at: String,
}

impl Animal {
    /// Whether `user_id` is allowed to walk and schedule activities for this
    /// animal.
    pub fn is_kept_by(&self, user_id: &str) -> bool {
        self.keeper_id.as_deref() == Some(user_id)
    }
}
