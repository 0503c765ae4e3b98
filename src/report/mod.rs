//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the crawl/series/fit code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::{
    format_forecast, format_forecast_unavailable, format_recent_table, format_update_summary,
};
