use std::fmt;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::FetchError;

/// One day of download counts for a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDownloads {
    #[serde(alias = "date")]
    pub day: String,
    pub downloads: u64,
}

/// Longest inclusive range, in days, the npm range endpoint answers (just under 18 months).
pub const MAX_RANGE_DAYS: u64 = 540;

/// Inclusive calendar range queried from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// From a fixed start up to today (UTC), clamped to what the registry serves.
    pub fn until_today(start: NaiveDate) -> Self {
        Self::clamped(start, chrono::Utc::now().date_naive())
    }

    /// A start after `end` collapses to `end`; a start more than
    /// [`MAX_RANGE_DAYS`] before `end` moves forward to the earliest allowed day.
    pub fn clamped(start: NaiveDate, end: NaiveDate) -> Self {
        let start = start.min(end);
        let earliest = end
            .checked_sub_days(Days::new(MAX_RANGE_DAYS - 1))
            .unwrap_or(start);
        if start < earliest {
            warn!(
                "date range start={} exceeds registry limit of {} days, using {}",
                start, MAX_RANGE_DAYS, earliest
            );
            return Self {
                start: earliest,
                end,
            };
        }
        Self { start, end }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

#[async_trait]
pub trait DownloadSource: Send + Sync {
    /// Daily download records for `package` over `range`.
    async fn fetch_daily(
        &self,
        package: &str,
        range: DateRange,
    ) -> Result<Vec<DailyDownloads>, FetchError>;
}
