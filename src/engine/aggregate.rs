// Download aggregation — one concurrent fetch per package, summed into a display total.

use std::collections::BTreeMap;
use std::time::Instant;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::format::display_total;
use super::stats::StatsCollector;
use crate::catalog::PackageDescriptor;
use crate::source::traits::{DailyDownloads, DateRange, DownloadSource};

/// Outcome of one aggregation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    /// Downloads per registry id; failed packages count as zero.
    pub per_package: BTreeMap<String, u64>,
    pub total: u64,
    /// Registry ids whose fetch failed this cycle, in catalog order.
    pub failed: Vec<String>,
    /// Formatted total, or the fallback literal when the total is zero.
    pub display: String,
}

impl AggregateReport {
    /// The report shown before any cycle has completed.
    pub fn placeholder(fallback: &str) -> Self {
        Self {
            per_package: BTreeMap::new(),
            total: 0,
            failed: Vec::new(),
            display: fallback.to_string(),
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn count_for(&self, registry_id: &str) -> Option<u64> {
        self.per_package.get(registry_id).copied()
    }
}

pub fn sum_daily(days: &[DailyDownloads]) -> u64 {
    days.iter()
        .fold(0u64, |acc, d| acc.saturating_add(d.downloads))
}

/// Fetch every package concurrently and fold the results into one report.
///
/// Individual failures never fail the whole operation: the package counts as
/// zero and is listed in [`AggregateReport::failed`].
pub async fn fetch_aggregate_downloads(
    source: &dyn DownloadSource,
    packages: &[PackageDescriptor],
    range: DateRange,
    fallback: &str,
) -> AggregateReport {
    fetch_aggregate_with_stats(source, packages, range, fallback, None).await
}

pub(crate) async fn fetch_aggregate_with_stats(
    source: &dyn DownloadSource,
    packages: &[PackageDescriptor],
    range: DateRange,
    fallback: &str,
    stats: Option<&StatsCollector>,
) -> AggregateReport {
    let started = Instant::now();

    let fetches = packages.iter().map(|pkg| async move {
        let result = source.fetch_daily(&pkg.registry_id, range).await;
        (pkg, result)
    });
    let results = join_all(fetches).await;

    let mut per_package = BTreeMap::new();
    let mut failed = Vec::new();
    for (pkg, result) in results {
        let count = match result {
            Ok(days) => {
                let sum = sum_daily(&days);
                debug!("package {} downloads={}", pkg.registry_id, sum);
                sum
            }
            Err(e) => {
                warn!("package {} counted as zero: {}", pkg.registry_id, e);
                failed.push(pkg.registry_id.clone());
                0
            }
        };
        per_package.insert(pkg.registry_id.clone(), count);
    }

    let total = per_package
        .values()
        .fold(0u64, |acc, n| acc.saturating_add(*n));
    let shown = display_total(total, fallback);

    if let Some(stats) = stats {
        stats.record_cycle(packages.len() as u64, failed.len() as u64, started.elapsed());
    }
    info!(
        "aggregate total={} display={} packages={} failed={}",
        total,
        shown,
        packages.len(),
        failed.len()
    );

    AggregateReport {
        per_package,
        total,
        failed,
        display: shown,
    }
}
