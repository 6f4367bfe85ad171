// Aggregation engine — concurrent fetch, totals, and the refresh poller.

pub mod aggregate;
pub mod format;
pub mod poller;
pub mod stats;
