// SPDX-License-Identifier: MIT

//! Scheduled activity (pickup/delivery booking) model.

use serde::{Deserialize, Serialize};

/// A committed pickup/delivery booking for one animal.
///
/// Dates are stored as ISO `YYYY-MM-DD` strings so Firestore range queries
/// sort them correctly; times are `HH:mm:ss`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledActivity {
    /// Document ID (server-generated UUID)
    pub activity_id: String,
    /// Booked animal
    pub animal_id: String,
    /// Booking user
    pub user_id: String,
    /// First reserved day (inclusive), `YYYY-MM-DD`
    pub start_date: String,
    /// Last reserved day (inclusive), `YYYY-MM-DD`
    pub end_date: String,
    /// Pickup time on the start day, `HH:mm:ss`
    pub pickup_time: String,
    /// Delivery (return) time on the end day, `HH:mm:ss`
    pub delivery_time: String,
    /// When the booking was committed (RFC3339)
    pub created_at: String,
}
