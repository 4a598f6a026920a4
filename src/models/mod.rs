// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod activity;
pub mod adoption;
pub mod animal;
pub mod stats;
pub mod user;
pub mod walk;

pub use activity::ScheduledActivity;
pub use adoption::{AdoptionRequest, RequestKind, RequestStatus};
pub use animal::{Animal, AnimalStatus};
pub use stats::UserStats;
pub use user::User;
pub use walk::{GeoPoint, MedalTier, Walk};
