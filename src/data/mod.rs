//! Source-site access: the HTTP client and the incremental crawl.

pub mod crawl;
pub mod source;

pub use crawl::{CrawlOutcome, fetch_since};
pub use source::{Fetch, SourceClient};
