//! Derived metrics: cumulative totals, rates, and the wild/controlled
//! split.
//!
//! Pure function of the base series; recomputed every run and never
//! persisted. Ratio columns are NaN where the denominator is zero: an
//! all-zero day has *no data* for that ratio, which is not the same as a
//! ratio of zero, and downstream display must keep the distinction.

use crate::domain::rules::columns;
use crate::domain::{DerivedRow, DerivedSeries, TimeSeries};

/// Compute the derived series, row-aligned with `series`.
pub fn derive(series: &TimeSeries) -> DerivedSeries {
    let local_confirmed = series.column_or_zero(columns::LOCAL_CONFIRMED);
    let local_asymptomatic = series.column_or_zero(columns::LOCAL_ASYMPTOMATIC);
    let imported_confirmed = series.column_or_zero(columns::IMPORTED_CONFIRMED);
    let imported_asymptomatic = series.column_or_zero(columns::IMPORTED_ASYMPTOMATIC);
    let recovered = series.column_or_zero(columns::RECOVERED);
    let released = series.column_or_zero(columns::RELEASED);
    let in_hospital = series.column_or_zero(columns::IN_HOSPITAL);
    let deaths = series.column_or_zero(columns::DEATHS);
    let reclassified = series.column_or_zero(columns::RECLASSIFIED);
    let quarantine_confirmed = series.column_or_zero(columns::QUARANTINE_CONFIRMED);
    let quarantine_asymptomatic = series.column_or_zero(columns::QUARANTINE_ASYMPTOMATIC);

    let mut cum_confirmed = 0;
    let mut cum_asymptomatic = 0;
    let mut cum_recovered = 0;
    let mut cum_released = 0;

    let mut rows = Vec::with_capacity(series.len());
    for (i, row) in series.rows.iter().enumerate() {
        let confirmed = local_confirmed[i] + imported_confirmed[i];
        let asymptomatic = local_asymptomatic[i] + imported_asymptomatic[i];

        cum_confirmed += confirmed;
        cum_asymptomatic += asymptomatic;
        cum_recovered += recovered[i];
        cum_released += released[i];
        let cum_infections = cum_confirmed + cum_asymptomatic;

        let new_total = confirmed + asymptomatic;
        let new_controlled_total = reclassified[i]
            + quarantine_confirmed[i]
            + quarantine_asymptomatic[i]
            + imported_confirmed[i]
            + imported_asymptomatic[i];
        let new_wild_total = new_total - new_controlled_total;

        rows.push(DerivedRow {
            date: row.date,
            local_confirmed: local_confirmed[i],
            local_asymptomatic: local_asymptomatic[i],
            imported_confirmed: imported_confirmed[i],
            imported_asymptomatic: imported_asymptomatic[i],
            recovered: recovered[i],
            released: released[i],
            in_hospital: in_hospital[i],
            deaths: deaths[i],
            reclassified: reclassified[i],
            quarantine_confirmed: quarantine_confirmed[i],
            quarantine_asymptomatic: quarantine_asymptomatic[i],
            confirmed,
            asymptomatic,
            cum_confirmed,
            cum_asymptomatic,
            cum_infections,
            cum_recovered,
            cum_released,
            under_observation: cum_infections - cum_released,
            confirmed_rate_pct: round_to(
                cum_confirmed as f64 / cum_infections as f64 * 100.0,
                1,
            ),
            new_total,
            new_controlled_total,
            new_wild_total,
            wild_ratio_pct: round_to(new_wild_total as f64 / new_total as f64, 3) * 100.0,
        });
    }

    DerivedSeries { rows }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
