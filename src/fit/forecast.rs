//! Fit window selection, forward projection, and the population-threshold
//! scan.

use chrono::{Days, NaiveDate};

use crate::domain::{DerivedSeries, FitResult, FitSpec, Projection, ThresholdCrossing};
use crate::error::AppError;
use crate::fit::fitter::fit_exponential;

/// Fit the exponential trend to daily new local cases in
/// `(since, fit_end)` and project `horizon_days` forward.
///
/// `since` is the same display cutoff used for plotting, so the fit
/// window's day offsets line up with the chart's x axis.
pub fn fit_and_project(
    derived: &DerivedSeries,
    since: NaiveDate,
    spec: &FitSpec,
) -> Result<FitResult, AppError> {
    let window_start_index = derived
        .rows
        .iter()
        .position(|r| r.date > since)
        .ok_or_else(|| AppError::fit("No rows after the display cutoff to fit."))?;

    let window: Vec<_> = derived.rows[window_start_index..]
        .iter()
        .take_while(|r| r.date < spec.fit_end)
        .collect();

    // Zero-based day offsets from the window's first row.
    let xs: Vec<f64> = (0..window.len()).map(|i| i as f64).collect();
    let ys: Vec<f64> = window
        .iter()
        .map(|r| (r.local_confirmed + r.local_asymptomatic) as f64)
        .collect();

    let (model, quality) = fit_exponential(&xs, &ys, spec.b_min, spec.b_max, spec.b_steps)?;

    let x_last = (window.len() - 1) as f64;
    let projections: Vec<Projection> = (0..spec.horizon_days)
        .filter_map(|i| {
            let date = spec.fit_end.checked_add_days(Days::new(i as u64))?;
            Some(Projection {
                date,
                value: model.predict(x_last + 1.0 + i as f64),
            })
        })
        .collect();

    // Threshold scan: from today's cumulative infections, keep adding
    // projected days until the population threshold is crossed or the cap
    // runs out ("not reached" is a perfectly good answer).
    let mut running = derived
        .rows
        .last()
        .map(|r| r.cum_infections)
        .unwrap_or(0) as f64;
    let last_rate = derived
        .rows
        .last()
        .map(|r| r.confirmed_rate_pct)
        .unwrap_or(f64::NAN);

    let mut threshold = None;
    for i in 0..spec.scan_cap {
        let daily = model.predict(x_last + 1.0 + i as f64) as i64;
        running += daily as f64;
        if running > spec.threshold() {
            let Some(date) = spec.fit_end.checked_add_days(Days::new(i as u64)) else {
                break;
            };
            let daily_confirmed = if last_rate.is_finite() {
                (daily as f64 * last_rate / 100.0) as i64
            } else {
                0
            };
            threshold = Some(ThresholdCrossing {
                date,
                daily_infected: daily,
                daily_confirmed,
            });
            break;
        }
    }

    Ok(FitResult {
        model,
        quality,
        window_start_index,
        window_end: spec.fit_end,
        projections,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::columns;
    use crate::domain::{RuleSet, SeriesRow, TimeSeries};
    use crate::series::derive;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Daily series starting 2022-03-01 with the given local confirmed
    /// counts (all other counters zero).
    fn derived_from_daily(counts: &[i64]) -> DerivedSeries {
        let schema = RuleSet::bulletin_2022().schema();
        let confirmed_idx = schema.iter().position(|c| c == columns::LOCAL_CONFIRMED).unwrap();
        let start = ymd(2022, 3, 1);
        let rows = counts
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let mut values = vec![0; schema.len()];
                values[confirmed_idx] = n;
                SeriesRow {
                    date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                    values,
                }
            })
            .collect();
        derive(&TimeSeries { columns: schema, rows })
    }

    #[test]
    fn projections_start_at_the_window_end_and_span_the_horizon() {
        // 2^x growth for a week; fit the first five days.
        let derived = derived_from_daily(&[1, 2, 4, 8, 16, 32, 64]);
        let since = ymd(2022, 2, 28);
        let mut spec = FitSpec::for_window_end(ymd(2022, 3, 6));
        spec.horizon_days = 3;

        let fit = fit_and_project(&derived, since, &spec).unwrap();
        assert_eq!(fit.window_start_index, 0);
        assert_eq!(fit.projections.len(), 3);
        assert_eq!(fit.projections[0].date, ymd(2022, 3, 6));
        assert_eq!(fit.projections[2].date, ymd(2022, 3, 8));

        // b should be close to ln(2); the first projected day continues
        // the observed doubling (window offsets 0..4, so x=5 predicts 32).
        assert!((fit.model.b - std::f64::consts::LN_2).abs() < 0.01, "b = {}", fit.model.b);
        assert!((fit.projections[0].value - 32.0).abs() < 1.0);
    }

    #[test]
    fn display_cutoff_offsets_the_window_start_index() {
        let derived = derived_from_daily(&[1, 2, 4, 8, 16, 32]);
        let since = ymd(2022, 3, 2);
        let spec = FitSpec::for_window_end(ymd(2022, 3, 6));

        let fit = fit_and_project(&derived, since, &spec).unwrap();
        assert_eq!(fit.window_start_index, 2);
    }

    #[test]
    fn threshold_scan_reports_the_first_breach_day() {
        let derived = derived_from_daily(&[1, 2, 4, 8, 16, 32, 64]);
        let since = ymd(2022, 2, 28);
        let mut spec = FitSpec::for_window_end(ymd(2022, 3, 6));
        // Total so far is 127; a tiny "population" makes the breach land
        // on the first projected day.
        spec.population = 1000;
        spec.population_fraction = 0.1;

        let fit = fit_and_project(&derived, since, &spec).unwrap();
        let crossing = fit.threshold.expect("threshold crossed");
        assert_eq!(crossing.date, ymd(2022, 3, 6));
        assert!(crossing.daily_infected >= 31);
    }

    #[test]
    fn flat_series_never_reaches_a_large_threshold() {
        let derived = derived_from_daily(&[3, 3, 3, 3, 3, 3]);
        let since = ymd(2022, 2, 28);
        let spec = FitSpec::for_window_end(ymd(2022, 3, 6));

        let fit = fit_and_project(&derived, since, &spec).unwrap();
        assert!(fit.threshold.is_none());
    }

    #[test]
    fn tiny_window_propagates_a_fit_error() {
        let derived = derived_from_daily(&[1, 2]);
        let since = ymd(2022, 2, 28);
        let spec = FitSpec::for_window_end(ymd(2022, 3, 6));
        let err = fit_and_project(&derived, since, &spec).unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }
}
