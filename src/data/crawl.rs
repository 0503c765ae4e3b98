//! Incremental crawl: walk index pages newest-first, stop at the watermark.
//!
//! Bulletins are listed newest-first and monotonically non-increasing in
//! date across pages, so the first entry older than the watermark ends the
//! whole crawl: later pages cannot contain newer data.
//!
//! Failure policy is best-effort partial ingestion:
//!
//! - a failed detail fetch abandons the rest of that page's entries and
//!   moves on to the next page
//! - a failed index fetch ends pagination, keeping whatever was collected
//!   (it is only a hard error when not even the first page was readable)
//!
//! Nothing already collected is ever rolled back.

use chrono::NaiveDate;

use crate::data::source::{Fetch, MAX_PAGES};
use crate::domain::BulletinEntry;
use crate::error::AppError;
use crate::extract::{extract_entries, strip_tags};

/// What a crawl saw, beyond the entries themselves. The counters make
/// source-side phrasing drift observable instead of silent.
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Bulletins with `date >= watermark`, in fetch order (newest first).
    /// May contain two entries for one date (summary line + dated
    /// bulletin); the merger collapses those.
    pub entries: Vec<BulletinEntry>,
    pub pages_fetched: usize,
    /// List items that matched no known title shape.
    pub skipped_titles: usize,
    /// Detail pages that could not be fetched (each also abandoned the
    /// remainder of its index page).
    pub failed_detail_fetches: usize,
    /// Set when the crawl ended by crossing the watermark (as opposed to
    /// exhausting `MAX_PAGES` or hitting an index fetch failure).
    pub stopped_at_watermark: bool,
    /// An index page fetch failure that ended pagination early.
    pub index_fetch_error: Option<String>,
}

/// Crawl index pages and fetch detail text for every bulletin dated on or
/// after `watermark`.
pub fn fetch_since(fetcher: &dyn Fetch, watermark: NaiveDate) -> Result<CrawlOutcome, AppError> {
    let mut out = CrawlOutcome::default();

    'pages: for page in 0..MAX_PAGES {
        let page_text = match fetcher.get(&fetcher.index_url(page)) {
            Ok(text) => text,
            Err(e) => {
                if out.pages_fetched == 0 {
                    return Err(e);
                }
                out.index_fetch_error = Some(e.to_string());
                break;
            }
        };
        out.pages_fetched += 1;

        let scan = extract_entries(&page_text);
        out.skipped_titles += scan.skipped_titles;

        for entry in scan.entries {
            if entry.date < watermark {
                out.stopped_at_watermark = true;
                break 'pages;
            }

            let detail = match fetcher.get(&fetcher.detail_url(&entry.detail_url)) {
                Ok(text) => text,
                Err(_) => {
                    out.failed_detail_fetches += 1;
                    continue 'pages;
                }
            };

            out.entries.push(BulletinEntry {
                date: entry.date,
                raw_text: strip_tags(&detail),
            });
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FakeFetch {
        pages: HashMap<String, String>,
        log: RefCell<Vec<String>>,
    }

    impl FakeFetch {
        fn new(pages: Vec<(String, String)>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                log: RefCell::new(Vec::new()),
            }
        }

        fn requested(&self, url: &str) -> bool {
            self.log.borrow().iter().any(|u| u == url)
        }
    }

    impl Fetch for FakeFetch {
        fn get(&self, url: &str) -> Result<String, AppError> {
            self.log.borrow_mut().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::fetch(format!("no page: {url}")))
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn list_line(href: &str, date: &str) -> String {
        let (y, m, d) = {
            let mut it = date.split('-');
            (
                it.next().unwrap(),
                it.next().unwrap().trim_start_matches('0').to_string(),
                it.next().unwrap().trim_start_matches('0').to_string(),
            )
        };
        format!(
            r#"<li><a href="{href}" title="上海{y}年{m}月{d}日，本市新增本土新冠肺炎确诊病例5例" target="_blank">…</a><span class="time">{date}</span></li>"#
        )
    }

    const BASE: &str = "https://wsjkw.sh.gov.cn";

    fn detail(url_suffix: &str) -> (String, String) {
        (
            format!("{BASE}{url_suffix}"),
            "<p>新增本土新冠肺炎确诊病例5例</p>".to_string(),
        )
    }

    #[test]
    fn stops_at_watermark_without_touching_older_entries_or_later_pages() {
        let page0 = [
            list_line("/xwfb/a.html", "2022-03-05"),
            list_line("/xwfb/b.html", "2022-03-04"),
            list_line("/xwfb/c.html", "2022-03-03"),
        ]
        .join("\n");
        let (a_url, a_body) = detail("/xwfb/a.html");
        let (b_url, b_body) = detail("/xwfb/b.html");

        let fetch = FakeFetch::new(vec![
            (format!("{BASE}/xwfb/index.html"), page0),
            (a_url, a_body),
            (b_url, b_body),
        ]);

        let out = fetch_since(&fetch, ymd(2022, 3, 4)).unwrap();
        assert!(out.stopped_at_watermark);
        assert_eq!(out.pages_fetched, 1);
        assert_eq!(
            out.entries.iter().map(|e| e.date).collect::<Vec<_>>(),
            vec![ymd(2022, 3, 5), ymd(2022, 3, 4)]
        );
        assert!(!fetch.requested(&format!("{BASE}/xwfb/c.html")));
        assert!(!fetch.requested(&format!("{BASE}/xwfb/index_2.html")));
    }

    #[test]
    fn walks_pages_until_the_watermark_is_crossed() {
        let page0 = list_line("/xwfb/a.html", "2022-03-05");
        let page1 = [
            list_line("/xwfb/b.html", "2022-03-04"),
            list_line("/xwfb/c.html", "2022-03-01"),
        ]
        .join("\n");
        let (a_url, a_body) = detail("/xwfb/a.html");
        let (b_url, b_body) = detail("/xwfb/b.html");

        let fetch = FakeFetch::new(vec![
            (format!("{BASE}/xwfb/index.html"), page0),
            (format!("{BASE}/xwfb/index_2.html"), page1),
            (a_url, a_body),
            (b_url, b_body),
        ]);

        let out = fetch_since(&fetch, ymd(2022, 3, 2)).unwrap();
        assert!(out.stopped_at_watermark);
        assert_eq!(out.pages_fetched, 2);
        assert_eq!(out.entries.len(), 2);
    }

    #[test]
    fn failed_detail_fetch_abandons_the_page_but_not_the_run() {
        let page0 = [
            // Detail for this one is missing from the fake.
            list_line("/xwfb/missing.html", "2022-03-05"),
            list_line("/xwfb/never-reached.html", "2022-03-04"),
        ]
        .join("\n");
        let page1 = list_line("/xwfb/b.html", "2022-03-03");
        let (b_url, b_body) = detail("/xwfb/b.html");

        let fetch = FakeFetch::new(vec![
            (format!("{BASE}/xwfb/index.html"), page0),
            (format!("{BASE}/xwfb/index_2.html"), page1),
            (b_url, b_body),
        ]);

        let out = fetch_since(&fetch, ymd(2022, 3, 1)).unwrap();
        assert_eq!(out.failed_detail_fetches, 1);
        assert!(!fetch.requested(&format!("{BASE}/xwfb/never-reached.html")));
        // The next page still contributed.
        assert_eq!(out.entries.iter().map(|e| e.date).collect::<Vec<_>>(), vec![ymd(2022, 3, 3)]);
    }

    #[test]
    fn failed_index_fetch_keeps_partial_results() {
        let page0 = list_line("/xwfb/a.html", "2022-03-05");
        let (a_url, a_body) = detail("/xwfb/a.html");

        // index_2.html is missing: pagination ends, page 0's harvest stays.
        let fetch =
            FakeFetch::new(vec![(format!("{BASE}/xwfb/index.html"), page0), (a_url, a_body)]);

        let out = fetch_since(&fetch, ymd(2022, 3, 1)).unwrap();
        assert_eq!(out.entries.len(), 1);
        assert!(out.index_fetch_error.is_some());
        assert!(!out.stopped_at_watermark);
    }

    #[test]
    fn unreachable_first_page_is_a_hard_error() {
        let fetch = FakeFetch::new(Vec::new());
        assert!(fetch_since(&fetch, ymd(2022, 3, 1)).is_err());
    }
}
