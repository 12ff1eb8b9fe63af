//! The Stratus application layer.
//!
//! Owns the location resolution & search pipeline — debounced suggestions,
//! exact-match submission, retry-on-reconnect, device location — and the
//! forecast state it feeds. Views (the CLI, or any other frontend) read
//! snapshots and never write pipeline state themselves.

pub mod connectivity;
pub mod forecast_model;
pub mod locate;
pub mod retry;
pub mod search;
pub mod state;
pub mod trend;

#[cfg(test)]
pub(crate) mod test_util;

pub use connectivity::{ConnectivityMonitor, NetworkState};
pub use forecast_model::{ForecastModel, ForecastState};
pub use retry::spawn_retry_on_reconnect;
pub use search::SearchController;
pub use state::SearchState;
