// SPDX-License-Identifier: MIT

//! Adoption / special-ownership request model.

use serde::{Deserialize, Serialize};

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Permanent adoption
    Adoption,
    /// "Special ownership": walking and visiting rights while the animal
    /// stays at the shelter
    SpecialOwnership,
}

/// Request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Stable name matching the serde representation, for query filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// Adoption request stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionRequest {
    /// Document ID (server-generated UUID)
    pub request_id: String,
    /// Requested animal
    pub animal_id: String,
    /// Requesting user
    pub user_id: String,
    /// Adoption or special ownership
    pub kind: RequestKind,
    /// Message from the requester to the shelter
    pub message: Option<String>,
    /// Current decision state
    pub status: RequestStatus,
    /// Shelter user who decided, once decided
    pub decided_by: Option<String>,
    /// When the decision was made (RFC3339)
    pub decided_at: Option<String>,
    /// When the request was filed (RFC3339)
    pub created_at: String,
}
