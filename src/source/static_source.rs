// Canned source — fixed per-package answers, used by tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{DailyDownloads, DateRange, DownloadSource};
use crate::error::FetchError;

#[derive(Clone)]
enum Canned {
    Days(Vec<DailyDownloads>),
    Fail,
}

/// A [`DownloadSource`] that answers from memory.
///
/// Packages with no canned answer fail with [`FetchError::NotFound`]. An
/// optional per-package delay lets tests control resolution order.
#[derive(Default)]
pub struct StaticSource {
    answers: RwLock<HashMap<String, Canned>>,
    delays: RwLock<HashMap<String, Duration>>,
    calls: AtomicU64,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `package` with one record per entry of `daily`.
    pub fn with_days(self, package: &str, daily: &[u64]) -> Self {
        let days = daily
            .iter()
            .enumerate()
            .map(|(i, n)| DailyDownloads {
                day: format!("day-{}", i),
                downloads: *n,
            })
            .collect();
        self.answers
            .write()
            .insert(package.to_string(), Canned::Days(days));
        self
    }

    /// Make every fetch of `package` fail with a network error.
    pub fn with_failure(self, package: &str) -> Self {
        self.answers
            .write()
            .insert(package.to_string(), Canned::Fail);
        self
    }

    pub fn with_delay(self, package: &str, delay: Duration) -> Self {
        self.delays.write().insert(package.to_string(), delay);
        self
    }

    /// Number of fetches started so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DownloadSource for StaticSource {
    async fn fetch_daily(
        &self,
        package: &str,
        _range: DateRange,
    ) -> Result<Vec<DailyDownloads>, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let delay = self.delays.read().get(package).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let answer = self.answers.read().get(package).cloned();
        match answer {
            Some(Canned::Days(days)) => Ok(days),
            Some(Canned::Fail) => Err(FetchError::Network("connection refused".to_string())),
            None => Err(FetchError::NotFound(package.to_string())),
        }
    }
}
