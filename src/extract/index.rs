//! Index page scanning: list items → `(detail_url, title, date)`.
//!
//! Only two title shapes qualify:
//!
//! - the "yesterday's figures" summary line, whose reported date is the
//!   list timestamp shifted back one day
//! - a dated bulletin line whose title starts with the region name and a
//!   year token, e.g. `上海2022年3月1日，本市新增…`
//!
//! Every other list item is skipped and counted, so a phrasing change on
//! the source site shows up as a rising skip count instead of silently
//! missing rows.

use chrono::{Days, NaiveDate};
use regex::Regex;

use crate::domain::IndexEntry;

/// List items must start with this to be considered at all.
const LIST_ITEM_PREFIX: &str = r#"<li><a href="/xwfb/"#;

/// Shape (a): yesterday's totals, published the morning after.
const YESTERDAY_PREFIX: &str = "昨日新增本土新冠肺炎确诊病例";

/// Shape (b): region prefix of dated bulletin titles.
const REGION_PREFIX: &str = "上海";

/// Separator between the date part and the announcement in shape (b).
const DATE_TITLE_SEPARATOR: &str = "日，";

/// Result of scanning one index page.
#[derive(Debug, Clone, Default)]
pub struct IndexScan {
    /// Qualifying entries in page order (newest first, as the source lists
    /// them).
    pub entries: Vec<IndexEntry>,
    /// List items that matched no known title shape.
    pub skipped_titles: usize,
}

/// Scan one index page's raw text for bulletin entries.
pub fn extract_entries(page_text: &str) -> IndexScan {
    // The list markup is regular enough that three anchored captures beat a
    // generic parser: href between `<a href="` and `" title=`, title between
    // `title="` and `" target=`, timestamp between `class="time">` and the
    // closing span.
    let href_re = Regex::new(r#"<a href="([^"]*)" title="#).expect("valid href regex");
    let title_re = Regex::new(r#"title="([^"]*)" target="#).expect("valid title regex");
    let time_re = Regex::new(r#"class="time">([^<]*)</span></li>"#).expect("valid time regex");

    let mut scan = IndexScan::default();

    for line in page_text.lines() {
        let line = line.trim();
        if !line.starts_with(LIST_ITEM_PREFIX) {
            continue;
        }

        let (Some(href), Some(title), Some(date_str)) = (
            capture(&href_re, line),
            capture(&title_re, line),
            capture(&time_re, line),
        ) else {
            scan.skipped_titles += 1;
            continue;
        };

        match classify_title(title, date_str) {
            Some((title, date)) => scan.entries.push(IndexEntry {
                detail_url: href.to_string(),
                title,
                date,
            }),
            None => scan.skipped_titles += 1,
        }
    }

    scan
}

fn capture<'t>(re: &Regex, line: &'t str) -> Option<&'t str> {
    re.captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Match a title against the known shapes, producing the cleaned title and
/// the bulletin date. `None` means the line is not a recognizable bulletin.
fn classify_title(title: &str, date_str: &str) -> Option<(String, NaiveDate)> {
    if let Some(rest) = title.strip_prefix(YESTERDAY_PREFIX) {
        // The list timestamp is the publication day; the figures are for
        // the day before.
        let listed = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").ok()?;
        let date = listed.checked_sub_days(Days::new(1))?;
        let title = format!("{}{}", YESTERDAY_PREFIX.trim_start_matches("昨日"), rest);
        return Some((title, date));
    }

    if title.starts_with(REGION_PREFIX) {
        let (date_part, announcement) = title.split_once(DATE_TITLE_SEPARATOR)?;
        // Older-format entries drop the year from the date part; those
        // cannot be dated reliably and are skipped.
        if !date_part.contains('年') {
            return None;
        }
        let iso = date_part
            .trim_start_matches(REGION_PREFIX)
            .replace('年', "-")
            .replace('月', "-")
            .replace('日', "");
        let date = NaiveDate::parse_from_str(&iso, "%Y-%m-%d").ok()?;
        return Some((announcement.to_string(), date));
    }

    None
}
