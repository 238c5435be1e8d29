//! Reporting period arithmetic.
//!
//! A capture always targets a `(year, month)` reporting period. By default
//! this is the month before the current date, since the statistics tool only
//! has complete data for finished months. The month before the target period
//! serves as the reference month for month-over-month comparisons.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One calendar month of report data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub year: i32,
    pub month: u32,
}

impl ReportingPeriod {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The default capture target: the month before `now`.
    pub fn target_for(now: DateTime<Utc>) -> Self {
        Self::new(now.year(), now.month()).previous()
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Month-over-month summaries are only produced on the first calendar day.
pub fn is_first_day_of_month(now: DateTime<Utc>) -> bool {
    now.day() == 1
}
