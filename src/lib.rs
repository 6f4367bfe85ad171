//! Download statistics for the zkthings npm packages.
//!
//! [`engine::aggregate::fetch_aggregate_downloads`] queries the registry for
//! every package concurrently and folds the answers into a display total.
//! [`engine::poller::StatsPoller`] keeps that total fresh, and
//! [`server::handler::StatsServer`] serves it to the site as JSON.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod server;
pub mod source;

pub use catalog::PackageDescriptor;
pub use config::StatsConfig;
pub use engine::aggregate::{fetch_aggregate_downloads, AggregateReport};
pub use engine::poller::{DisplayState, StatsPoller};
pub use error::FetchError;
pub use source::traits::{DailyDownloads, DateRange, DownloadSource};
