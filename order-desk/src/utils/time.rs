//! Pickup time arithmetic and urgency classification
//!
//! Read-side only: nothing here touches the store. Cheap enough to run for
//! every pending order on every refresh tick.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Returned for an unparseable pickup time; far enough out to never be urgent
pub const NEVER_URGENT_MINUTES: i64 = 999;

/// Orders due within this many minutes are urgent
pub const URGENT_WINDOW_MINUTES: i64 = 60;

/// Urgency class derived from minutes until pickup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Pickup time has passed
    Overdue,
    /// Due within the next hour (inclusive)
    Urgent,
    Normal,
}

impl Urgency {
    /// `m < 0` overdue, `0..=60` urgent, otherwise normal
    pub fn classify(minutes: i64) -> Self {
        if minutes < 0 {
            Urgency::Overdue
        } else if minutes <= URGENT_WINDOW_MINUTES {
            Urgency::Urgent
        } else {
            Urgency::Normal
        }
    }
}

/// Parse a pickup time (HH:MM)
pub fn parse_pickup_time(pickup_time: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(pickup_time.trim(), "%H:%M").ok()
}

/// Whole minutes from `now` until `pickup_time` on the same calendar day
///
/// Negative once the pickup time has passed. Partial minutes truncate toward
/// zero. A malformed pickup time yields [`NEVER_URGENT_MINUTES`].
pub fn remaining_minutes(pickup_time: &str, now: NaiveDateTime) -> i64 {
    match parse_pickup_time(pickup_time) {
        Some(time) => {
            let target = now.date().and_time(time);
            (target - now).num_minutes()
        }
        None => {
            tracing::debug!(pickup_time, "Unparseable pickup time, treating as not urgent");
            NEVER_URGENT_MINUTES
        }
    }
}

/// Display label for a minute delta
pub fn format_remaining(minutes: i64) -> String {
    if minutes < 0 {
        return format!("{} min overdue", minutes.abs());
    }
    if minutes == 0 {
        return "due now".to_string();
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{} min left", m),
        (h, 0) => format!("{}h left", h),
        (h, m) => format!("{}h {}m left", h, m),
    }
}
