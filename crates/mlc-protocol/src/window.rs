//! Analysis time windows.
//!
//! Every AWS-facing usage or cost figure carries one of these so report
//! numbers are never ambiguous about the period they cover.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid time window: {0}")]
pub struct WindowError(pub String);

/// A half-open UTC time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window covering the last `days` days, ending now.
    ///
    /// Rejects `days < 1` — the validation happens here, before any
    /// network call is made on the window's behalf.
    pub fn last_days(days: i64) -> Result<Self, WindowError> {
        if days < 1 {
            return Err(WindowError(format!("day range must be >= 1, got {days}")));
        }
        let end = Utc::now();
        Ok(Self {
            start: end - Duration::days(days),
            end,
        })
    }

    /// Window covering the last `hours` hours, ending now.
    pub fn last_hours(hours: i64) -> Result<Self, WindowError> {
        if hours < 1 {
            return Err(WindowError(format!("hour range must be >= 1, got {hours}")));
        }
        let end = Utc::now();
        Ok(Self {
            start: end - Duration::hours(hours),
            end,
        })
    }

    pub fn from_bounds(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if start >= end {
            return Err(WindowError("window start must precede end".into()));
        }
        Ok(Self { start, end })
    }

    /// Whole days spanned, rounded up.
    pub fn days(&self) -> i64 {
        let secs = (self.end - self.start).num_seconds();
        // Equivalent to `i64::div_ceil(secs, 86_400)`, which is still unstable
        // on stable Rust (int_roundings); divisor is positive.
        secs / 86_400 + if secs % 86_400 > 0 { 1 } else { 0 }
    }

    /// Human-readable label for report text, e.g. "last 30 days".
    pub fn label(&self) -> String {
        let days = self.days();
        if days == 1 {
            "last 24 hours".to_string()
        } else {
            format!("last {days} days")
        }
    }
}
