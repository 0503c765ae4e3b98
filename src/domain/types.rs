//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during crawling and fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One list item scraped from an index page.
///
/// `detail_url` is site-relative (as it appears in the page source);
/// [`crate::data::source`] turns it into an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub detail_url: String,
    pub title: String,
    pub date: NaiveDate,
}

/// One dated bulletin: the date it reports on plus the detail page's body
/// text with markup stripped. Consumed immediately by the counter parser.
#[derive(Debug, Clone)]
pub struct BulletinEntry {
    pub date: NaiveDate,
    pub raw_text: String,
}

/// A dated row of counter values, aligned with a column schema held by the
/// owning [`TimeSeries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRow {
    pub date: NaiveDate,
    pub values: Vec<i64>,
}

/// The persisted, append-only time series.
///
/// Invariants:
/// - `rows` are sorted strictly ascending by date, one row per date
/// - every row has exactly `columns.len()` values
/// - the column set only ever grows; rows predating a column hold 0 there
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeSeries {
    pub columns: Vec<String>,
    pub rows: Vec<SeriesRow>,
}

impl TimeSeries {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// The watermark: most recent date present, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Extract one column by label, zero-filled when the column does not
    /// exist. Always returns `rows.len()` values.
    pub fn column_or_zero(&self, label: &str) -> Vec<i64> {
        match self.column_index(label) {
            Some(idx) => self.rows.iter().map(|r| r.values[idx]).collect(),
            None => vec![0; self.rows.len()],
        }
    }
}

/// One row of the derived series: the base counters joined with every
/// computed column. Pure function of the base series, never persisted.
#[derive(Debug, Clone)]
pub struct DerivedRow {
    pub date: NaiveDate,

    pub local_confirmed: i64,
    pub local_asymptomatic: i64,
    pub imported_confirmed: i64,
    pub imported_asymptomatic: i64,
    pub recovered: i64,
    pub released: i64,
    pub in_hospital: i64,
    pub deaths: i64,
    pub reclassified: i64,
    pub quarantine_confirmed: i64,
    pub quarantine_asymptomatic: i64,

    /// local + imported confirmed.
    pub confirmed: i64,
    /// local + imported asymptomatic.
    pub asymptomatic: i64,

    pub cum_confirmed: i64,
    pub cum_asymptomatic: i64,
    pub cum_infections: i64,
    pub cum_recovered: i64,
    pub cum_released: i64,

    /// cumulative infections minus cumulative released.
    pub under_observation: i64,
    /// Share of confirmed among cumulative infections, one decimal.
    /// NaN before the first infection is recorded.
    pub confirmed_rate_pct: f64,

    pub new_total: i64,
    pub new_controlled_total: i64,
    pub new_wild_total: i64,
    /// Share of new cases found outside containment. NaN on an all-zero
    /// day; consumers must treat NaN as "no data", never as zero.
    pub wild_ratio_pct: f64,
}

/// Derived metrics over a full [`TimeSeries`], row-aligned with it.
#[derive(Debug, Clone, Default)]
pub struct DerivedSeries {
    pub rows: Vec<DerivedRow>,
}

impl DerivedSeries {
    /// Rows with `date > since`, preserving order.
    pub fn since(&self, since: NaiveDate) -> Vec<&DerivedRow> {
        self.rows.iter().filter(|r| r.date > since).collect()
    }
}

/// Coefficients of the exponential trend `y = a * exp(b * x) + c`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpModel {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl ExpModel {
    /// Evaluate the model at day offset `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.a * (self.b * x).exp() + self.c
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// One projected day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub date: NaiveDate,
    pub value: f64,
}

/// The first projected day on which cumulative infections exceed the
/// population threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdCrossing {
    pub date: NaiveDate,
    /// Projected new infections on that day.
    pub daily_infected: i64,
    /// Projected new confirmed cases, scaled by the latest confirmed rate.
    pub daily_confirmed: i64,
}

/// Full output of a fit + projection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub model: ExpModel,
    pub quality: FitQuality,
    /// Index of the fit window's first row within the analyzed series.
    pub window_start_index: usize,
    /// First date after the fit window (projection origin).
    pub window_end: NaiveDate,
    pub projections: Vec<Projection>,
    pub threshold: Option<ThresholdCrossing>,
}

/// Fit/projection parameters resolved from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitSpec {
    /// Rows with `date < fit_end` (and after the display cutoff) form the
    /// fit window.
    pub fit_end: NaiveDate,
    /// Days to project past the window.
    pub horizon_days: usize,
    /// Growth-rate grid bounds and resolution for the first search pass.
    pub b_min: f64,
    pub b_max: f64,
    pub b_steps: usize,
    /// Population and the fraction of it that triggers the breach report.
    pub population: i64,
    pub population_fraction: f64,
    /// Iteration cap for the threshold scan.
    pub scan_cap: usize,
}

impl FitSpec {
    /// Defaults matching the daily-bulletin workflow; the CLI overrides
    /// individual fields.
    pub fn for_window_end(fit_end: NaiveDate) -> Self {
        Self {
            fit_end,
            horizon_days: 5,
            b_min: -1.0,
            b_max: 1.0,
            b_steps: 401,
            population: 25_000_000,
            population_fraction: 0.2,
            scan_cap: 100,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.population as f64 * self.population_fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_or_zero_fills_missing_columns() {
        let d = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let ts = TimeSeries {
            columns: vec!["a".to_string()],
            rows: vec![SeriesRow {
                date: d,
                values: vec![7],
            }],
        };
        assert_eq!(ts.column_or_zero("a"), vec![7]);
        assert_eq!(ts.column_or_zero("b"), vec![0]);
    }

    #[test]
    fn exp_model_predicts_constant_when_b_is_zero() {
        let m = ExpModel { a: 2.0, b: 0.0, c: 3.0 };
        assert!((m.predict(0.0) - 5.0).abs() < 1e-12);
        assert!((m.predict(10.0) - 5.0).abs() < 1e-12);
    }
}
