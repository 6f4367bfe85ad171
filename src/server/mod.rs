// Read-only HTTP view of the poller's display state.

pub mod handler;
