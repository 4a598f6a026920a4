// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting.
//!
//! Walk records use the client's display formats on the wire: `dd/MM/yyyy`
//! dates and `HH:mm:ss` times. Everything else is RFC3339 UTC.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format the walk-record date field (`dd/MM/yyyy`).
pub fn format_walk_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Format a walk-record time field (`HH:mm:ss`).
pub fn format_walk_time(time: DateTime<Utc>) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Parse an ISO `YYYY-MM-DD` date as used for activity storage and queries.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Format a date as ISO `YYYY-MM-DD` (sortable, used as the storage format).
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
