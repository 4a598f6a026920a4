// SPDX-License-Identifier: MIT

//! Activity date-range scheduling.
//!
//! Two halves: a calendar selection state machine mirroring how the client
//! picks a range day by day, and the commit-time validation gates. Every
//! rejection is a named, user-correctable error; nothing here retries.

use crate::models::activity::ScheduledActivity;
use crate::time_utils::parse_iso_date;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Minimum lead time between "now" and the pickup instant.
const MIN_LEAD_TIME_HOURS: i64 = 24;

/// Validation outcomes surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum ScheduleError {
    #[error("Pickup or delivery time is outside shelter opening hours")]
    TimeOutsideOpeningHours,

    #[error("The requested dates overlap an existing booking")]
    DateConflict,

    #[error("Activities must be scheduled at least 24 hours in advance")]
    LessThan24Hours,

    #[error("The animal already has an active scheduled activity")]
    ActiveActivityExists,

    #[error("No date range selected")]
    NoDateSelected,
}

impl ScheduleError {
    /// Stable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            ScheduleError::TimeOutsideOpeningHours => "time_outside_opening_hours",
            ScheduleError::DateConflict => "date_conflict",
            ScheduleError::LessThan24Hours => "less_than_24_hours",
            ScheduleError::ActiveActivityExists => "active_activity_exists",
            ScheduleError::NoDateSelected => "no_date_selected",
        }
    }
}

/// Shelter opening hours gate.
#[derive(Debug, Clone, Copy)]
pub struct ShelterHours {
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
}

impl ShelterHours {
    /// Whether a pickup/delivery time falls within opening hours (inclusive).
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.opens_at && time <= self.closes_at
    }
}

/// Derived, read-only view of the days already reserved for one animal.
///
/// Recomputed per scheduling attempt from committed activities; never
/// persisted on its own.
#[derive(Debug, Clone, Default)]
pub struct BookedDates(BTreeSet<NaiveDate>);

impl BookedDates {
    /// Expand committed activities into the set of reserved days.
    /// Records with unparseable dates are skipped rather than failing the
    /// whole attempt.
    pub fn from_activities(activities: &[ScheduledActivity]) -> Self {
        let mut set = BTreeSet::new();
        for activity in activities {
            let (Some(start), Some(end)) = (
                parse_iso_date(&activity.start_date),
                parse_iso_date(&activity.end_date),
            ) else {
                tracing::warn!(
                    activity_id = %activity.activity_id,
                    "Skipping activity with unparseable dates"
                );
                continue;
            };
            let mut day = start;
            while day <= end {
                set.insert(day);
                day += Duration::days(1);
            }
        }
        Self(set)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    /// Whether any day in the inclusive range is already booked.
    pub fn conflicts_with(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.0.range(start..=end).next().is_some()
    }

    /// Reserved days in ascending order (for the client's calendar view).
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.iter().copied()
    }

    #[cfg(test)]
    fn with_dates(dates: &[NaiveDate]) -> Self {
        Self(dates.iter().copied().collect())
    }
}

/// Calendar selection state, driven one click at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelection {
    /// Nothing picked yet
    Empty,
    /// A tentative start day
    Start(NaiveDate),
    /// A full inclusive range
    Range { start: NaiveDate, end: NaiveDate },
}

impl DateSelection {
    /// Apply one date click.
    ///
    /// - With no active selection (or a completed range), the clicked date
    ///   becomes the tentative start.
    /// - With a tentative start, the inclusive range to the clicked date is
    ///   materialized, swapping endpoints if the click precedes the start.
    /// - If any day of that candidate range is booked, the whole selection is
    ///   rejected and the clicked date becomes the new tentative start.
    pub fn select(self, clicked: NaiveDate, booked: &BookedDates) -> DateSelection {
        match self {
            DateSelection::Empty | DateSelection::Range { .. } => DateSelection::Start(clicked),
            DateSelection::Start(start) => {
                let (lo, hi) = if clicked < start {
                    (clicked, start)
                } else {
                    (start, clicked)
                };
                if booked.conflicts_with(lo, hi) {
                    // Reset-on-conflict: the previous selection is discarded
                    DateSelection::Start(clicked)
                } else {
                    DateSelection::Range { start: lo, end: hi }
                }
            }
        }
    }
}

/// Transient booking input, validated before commit.
#[derive(Debug, Clone, Copy)]
pub struct ProposedBooking {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub delivery_time: NaiveTime,
}

/// Run all commit-time gates over a proposed booking.
///
/// `has_active_activity` is whether the animal already has a committed
/// activity whose range overlaps today.
pub fn validate_booking(
    booking: &ProposedBooking,
    booked: &BookedDates,
    hours: &ShelterHours,
    has_active_activity: bool,
    now: DateTime<Utc>,
) -> Result<(), ScheduleError> {
    if booking.end_date < booking.start_date {
        return Err(ScheduleError::NoDateSelected);
    }

    if !hours.contains(booking.pickup_time) || !hours.contains(booking.delivery_time) {
        return Err(ScheduleError::TimeOutsideOpeningHours);
    }

    let pickup_instant = Utc.from_utc_datetime(&booking.start_date.and_time(booking.pickup_time));
    if pickup_instant - now < Duration::hours(MIN_LEAD_TIME_HOURS) {
        return Err(ScheduleError::LessThan24Hours);
    }

    if has_active_activity {
        return Err(ScheduleError::ActiveActivityExists);
    }

    if booked.conflicts_with(booking.start_date, booking.end_date) {
        return Err(ScheduleError::DateConflict);
    }

    Ok(())
}

/// Whether a stored activity's range overlaps the given day.
pub fn is_active_on(activity: &ScheduledActivity, day: NaiveDate) -> bool {
    match (
        parse_iso_date(&activity.start_date),
        parse_iso_date(&activity.end_date),
    ) {
        (Some(start), Some(end)) => start <= day && day <= end,
        _ => false,
    }
}
