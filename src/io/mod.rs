//! Persistence: the CSV time-series store and JSON forecast export.

pub mod export;
pub mod store;

pub use store::SeriesStore;
