// Polling service — owns the display state and refreshes it on a fixed interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::aggregate::{fetch_aggregate_with_stats, AggregateReport};
use super::stats::{StatsCollector, StatsSnapshot};
use crate::catalog::PackageDescriptor;
use crate::config::StatsConfig;
use crate::source::traits::{DateRange, DownloadSource};

/// What the view layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    pub display: String,
    pub report: AggregateReport,
    /// `None` until the first cycle publishes.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Sequence number of the cycle that produced this state; 0 for the placeholder.
    pub cycle: u64,
}

impl DisplayState {
    fn placeholder(fallback: &str) -> Self {
        Self {
            display: fallback.to_string(),
            report: AggregateReport::placeholder(fallback),
            refreshed_at: None,
            cycle: 0,
        }
    }
}

struct Running {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct StatsPoller {
    source: Arc<dyn DownloadSource>,
    packages: Vec<PackageDescriptor>,
    start_date: NaiveDate,
    fallback: String,
    interval: Duration,
    state_tx: watch::Sender<DisplayState>,
    stats: Arc<StatsCollector>,
    next_cycle: AtomicU64,
    running: Mutex<Option<Running>>,
}

impl StatsPoller {
    pub fn new(
        source: Arc<dyn DownloadSource>,
        packages: Vec<PackageDescriptor>,
        config: &StatsConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(DisplayState::placeholder(&config.fallback_display));
        Self {
            source,
            packages,
            start_date: config.start_date,
            fallback: config.fallback_display.clone(),
            interval: config.refresh_interval(),
            state_tx,
            stats: Arc::new(StatsCollector::new()),
            next_cycle: AtomicU64::new(1),
            running: Mutex::new(None),
        }
    }

    pub fn packages(&self) -> &[PackageDescriptor] {
        &self.packages
    }

    pub fn snapshot(&self) -> DisplayState {
        self.state_tx.borrow().clone()
    }

    /// Receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.state_tx.subscribe()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Run one aggregation cycle and publish it. Returns the state after publishing.
    pub async fn refresh_once(&self) -> DisplayState {
        let (cycle, report) = self.run_cycle().await;
        self.publish(cycle, report);
        self.snapshot()
    }

    async fn run_cycle(&self) -> (u64, AggregateReport) {
        let cycle = self.next_cycle.fetch_add(1, Ordering::Relaxed);
        let range = DateRange::until_today(self.start_date);
        debug!("cycle {} started range={}", cycle, range);
        let report = fetch_aggregate_with_stats(
            self.source.as_ref(),
            &self.packages,
            range,
            &self.fallback,
            Some(&self.stats),
        )
        .await;
        (cycle, report)
    }

    /// Last-write-wins by cycle number: a cycle older than the current state is dropped.
    fn publish(&self, cycle: u64, report: AggregateReport) {
        let published = self.state_tx.send_if_modified(|current| {
            if cycle < current.cycle {
                return false;
            }
            *current = DisplayState {
                display: report.display.clone(),
                report,
                refreshed_at: Some(Utc::now()),
                cycle,
            };
            true
        });
        if !published {
            debug!("cycle {} stale, not published", cycle);
        }
    }

    /// Spawn the refresh loop: one cycle now, then one per interval. No-op if already running.
    pub fn start(self: &Arc<Self>) {
        let mut running = self.running.lock();
        if running.is_some() {
            return;
        }

        let token = CancellationToken::new();
        let poller = Arc::downgrade(self);
        let loop_token = token.clone();
        let interval = self.interval;
        let handle = tokio::spawn(async move {
            Self::refresh_loop(poller, interval, loop_token).await;
        });
        info!(
            "stats poller started packages={} interval={}s",
            self.packages.len(),
            self.interval.as_secs()
        );
        *running = Some(Running { token, handle });
    }

    /// Holds a strong handle only while a cycle runs, so dropping the last
    /// owner ends the loop.
    async fn refresh_loop(poller: Weak<Self>, interval: Duration, token: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let Some(poller) = poller.upgrade() else {
                break;
            };
            let (cycle, report) = tokio::select! {
                out = poller.run_cycle() => out,
                _ = token.cancelled() => break,
            };
            if token.is_cancelled() {
                break;
            }
            poller.publish(cycle, report);
        }
        debug!("stats poller loop exited");
    }

    /// Cancel the refresh loop. In-flight requests are abandoned. Idempotent.
    pub fn stop(&self) {
        if let Some(running) = self.running.lock().take() {
            running.token.cancel();
            running.handle.abort();
            info!("stats poller stopped");
        }
    }
}

impl Drop for StatsPoller {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.token.cancel();
            running.handle.abort();
        }
    }
}
