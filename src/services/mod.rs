// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod medal;
pub mod ranking;
pub mod sampler;
pub mod schedule;
pub mod walk;

pub use medal::{medal_for_distance, medal_for_duration};
pub use ranking::{build_rankings, RankEntry};
pub use sampler::{LocationSampler, LocationSource, SamplerConfig};
pub use schedule::{BookedDates, DateSelection, ProposedBooking, ScheduleError, ShelterHours};
pub use walk::{DistanceAccumulator, LocationFix, WalkHandle, WalkRegistry, WalkSummary};
