//! Detail page body extraction.

use regex::Regex;

/// Strip markup tags, keeping only text content.
///
/// Text nodes are concatenated with no separator so announcement phrases
/// that span inline tags (`新增本土<span>确诊</span>…`) remain matchable
/// by the counter patterns.
pub fn strip_tags(html: &str) -> String {
    let tags = Regex::new(r"(?is)<[^>]+>").expect("valid tags regex");
    tags.replace_all(html, "").trim().to_string()
}
