//! HTTP access to the bulletin site.
//!
//! The crawl needs two things from the outside world: "text of index page
//! i" and "text of this detail link". That is the whole seam: [`Fetch`].
//! Production uses [`SourceClient`] (blocking reqwest); tests hand the
//! controller a map-backed fake.

use reqwest::blocking::Client;

use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://wsjkw.sh.gov.cn";

/// Bounded full rescan: never walk past this many index pages.
pub const MAX_PAGES: usize = 50;

/// The site serves different (sparser) markup to clients without a desktop
/// browser user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36";

/// Anything that can resolve a URL to page text.
///
/// URL construction has default implementations so fakes only need `get`;
/// [`SourceClient`] overrides the base to honor its environment override.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<String, AppError>;

    fn base_url(&self) -> &str {
        DEFAULT_BASE_URL
    }

    /// URL of index page `i` (zero-based). Page 0 is `index.html`, later
    /// pages are `index_2.html`, `index_3.html`, ….
    fn index_url(&self, page: usize) -> String {
        if page == 0 {
            format!("{}/xwfb/index.html", self.base_url())
        } else {
            format!("{}/xwfb/index_{}.html", self.base_url(), page + 1)
        }
    }

    /// Absolute URL for a site-relative detail link.
    fn detail_url(&self, href: &str) -> String {
        format!("{}{}", self.base_url(), href)
    }
}

pub struct SourceClient {
    client: Client,
    base_url: String,
}

impl SourceClient {
    /// Build a client, honoring an `EPI_BASE_URL` override from the
    /// environment (useful against mirrors).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var("EPI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::fetch(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }
}

impl Fetch for SourceClient {
    fn get(&self, url: &str) -> Result<String, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::fetch(format!("Request to {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(format!(
                "Request to {url} failed with status {}.",
                resp.status()
            )));
        }

        resp.text()
            .map_err(|e| AppError::fetch(format!("Failed to read body of {url}: {e}")))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
