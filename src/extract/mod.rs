//! Bulletin text extraction.
//!
//! The source markup is stable but not reliably well-formed, so everything
//! here is a deliberate text scan ("find anchor substrings, slice, trim")
//! rather than a DOM parse. Keeping that behind this module's interface
//! means a structured-parse replacement would be a drop-in.

pub mod body;
pub mod counters;
pub mod index;

pub use body::strip_tags;
pub use counters::{CompiledRules, parse_counters};
pub use index::{IndexScan, extract_entries};
