//! Utilities - logging and pickup time helpers
//!
//! - [`logger`] - tracing subscriber setup
//! - [`time`] - remaining minutes and urgency classes

pub mod logger;
pub mod time;

pub use time::{Urgency, format_remaining, remaining_minutes};
