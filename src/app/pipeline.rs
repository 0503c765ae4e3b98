//! Shared pipeline logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! crawl -> parse -> merge -> persist, then derive -> fit.
//!
//! The subcommands can then focus on presentation (charts vs tables).
//!
//! Everything ambient (the store, the fetcher, the rule set, "today") is
//! a parameter here, so tests can run the full pipeline against fixed
//! dates and fake pages.

use chrono::NaiveDate;

use crate::data::source::Fetch;
use crate::data::{CrawlOutcome, fetch_since};
use crate::domain::{
    BulletinEntry, DerivedSeries, FitResult, FitSpec, RuleSet, SeriesRow, TimeSeries,
};
use crate::error::AppError;
use crate::extract::{CompiledRules, parse_counters};
use crate::fit::fit_and_project;
use crate::io::SeriesStore;
use crate::series::{derive, merge};

/// First date the bulletin series covers; the crawl watermark when no
/// store exists yet.
fn bootstrap_watermark() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 2, 26).expect("valid bootstrap date")
}

/// A refreshed series plus what the crawl saw (when one ran at all).
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub series: TimeSeries,
    /// `None` when the store was already fresh and no crawl was needed.
    pub crawl: Option<CrawlOutcome>,
}

/// Bring the persisted series up to date.
///
/// Without `force`, the crawl only runs when the store is missing or was
/// last written before `today`; the source publishes once a day, so one
/// refresh per day is enough.
pub fn update_series(
    store: &SeriesStore,
    fetcher: &dyn Fetch,
    rules: &RuleSet,
    today: NaiveDate,
    force: bool,
) -> Result<UpdateOutcome, AppError> {
    let existing = store.load()?;
    let needs_crawl = force || existing.is_none() || store.is_stale(today);
    let old = existing.unwrap_or_else(|| TimeSeries::new(rules.schema()));

    if !needs_crawl {
        return Ok(UpdateOutcome {
            series: old,
            crawl: None,
        });
    }

    let compiled = CompiledRules::compile(rules)?;
    let watermark = old.last_date().unwrap_or_else(bootstrap_watermark);

    let crawl = fetch_since(fetcher, watermark)?;
    let batch = batch_from_entries(&crawl.entries, &compiled);
    let merged = merge(&old, &batch);

    store.save(&merged)?;

    Ok(UpdateOutcome {
        series: merged,
        crawl: Some(crawl),
    })
}

/// Parse crawled bulletins into a series batch, keeping crawl order.
fn batch_from_entries(entries: &[BulletinEntry], rules: &CompiledRules) -> TimeSeries {
    TimeSeries {
        columns: rules.schema().to_vec(),
        rows: entries
            .iter()
            .map(|e| SeriesRow {
                date: e.date,
                values: parse_counters(&e.raw_text, rules),
            })
            .collect(),
    }
}

/// Compute derived metrics and, when requested, the trend forecast.
///
/// A failed fit does not fail the analysis: the caller gets the derived
/// series either way, plus the fit error to report as "forecast
/// unavailable".
pub fn analyze(
    series: &TimeSeries,
    since: NaiveDate,
    fit: Option<&FitSpec>,
) -> (DerivedSeries, Option<Result<FitResult, AppError>>) {
    let derived = derive(series);
    let fit = fit.map(|spec| fit_and_project(&derived, since, spec));
    (derived, fit)
}
