//! Time-series assembly: merging crawl batches into history and computing
//! derived metrics.

pub mod derive;
pub mod merge;

pub use derive::derive;
pub use merge::merge;
