//! Report formatting: crawl summaries, the recent-rows table, and the
//! forecast block.

use crate::data::CrawlOutcome;
use crate::domain::rules::columns;
use crate::domain::{DerivedRow, FitResult, TimeSeries};
use crate::error::AppError;

/// Summarize what an update run did, including the counters that make
/// source-side drift visible (skipped titles, failed fetches).
pub fn format_update_summary(crawl: &CrawlOutcome, series: &TimeSeries) -> String {
    let mut out = String::new();

    out.push_str("=== epi - bulletin update ===\n");
    out.push_str(&format!(
        "Pages fetched: {} | bulletins: {} | unrecognized titles: {}\n",
        crawl.pages_fetched,
        crawl.entries.len(),
        crawl.skipped_titles
    ));
    if crawl.failed_detail_fetches > 0 {
        out.push_str(&format!(
            "Detail fetch failures: {} (those pages contributed partially)\n",
            crawl.failed_detail_fetches
        ));
    }
    if let Some(err) = &crawl.index_fetch_error {
        out.push_str(&format!("Pagination ended early: {err}\n"));
    }

    match series.last_date() {
        Some(date) => out.push_str(&format!(
            "Series: {} rows through {date}\n",
            series.len()
        )),
        None => out.push_str("Series: empty\n"),
    }

    out
}

/// The recent-rows table: headline counters for the last `limit` days.
pub fn format_recent_table(rows: &[&DerivedRow], limit: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>8}\n",
        columns::DATE,
        "新增确诊",
        "新增无症状",
        columns::RECOVERED,
        columns::RELEASED,
        columns::DEATHS
    ));

    let start = rows.len().saturating_sub(limit);
    for row in &rows[start..] {
        out.push_str(&format!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>8}\n",
            row.date.to_string(),
            row.confirmed,
            row.asymptomatic,
            row.recovered,
            row.released,
            row.deaths
        ));
    }

    out
}

/// The forecast block: fitted coefficients, the projected days, and the
/// threshold crossing when the trend reaches it.
pub fn format_forecast(fit: &FitResult) -> String {
    let mut out = String::new();

    out.push_str("Fitted trend: y = a * exp(b * x) + c\n");
    out.push_str(&format!(
        "a={:.3}, b={:.3}, c={:.3} (rmse={:.2}, n={})\n",
        fit.model.a, fit.model.b, fit.model.c, fit.quality.rmse, fit.quality.n
    ));

    out.push_str("\nProjected new cases (confirmed + asymptomatic):\n");
    for p in &fit.projections {
        out.push_str(&format!("{}: {}\n", p.date, p.value as i64));
    }

    match &fit.threshold {
        Some(crossing) => {
            out.push_str(&format!(
                "\nOn this trend, cumulative infections pass the population \
                 threshold on {}:\n",
                crossing.date
            ));
            out.push_str(&format!("  new infections that day: {}\n", crossing.daily_infected));
            out.push_str(&format!("  of which confirmed: {}\n", crossing.daily_confirmed));
        }
        None => {
            out.push_str("\nThe population threshold is not reached within the scan horizon.\n");
        }
    }

    out
}

/// Shown instead of the forecast block when fitting fails; the base series
/// is still displayed.
pub fn format_forecast_unavailable(err: &AppError) -> String {
    format!("Forecast unavailable: {err}\n")
}
