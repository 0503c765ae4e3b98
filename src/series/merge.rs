//! Merging a freshly crawled batch into the persisted series.
//!
//! Rules:
//!
//! - only batch rows dated strictly after the old series' last date are
//!   taken, so re-running with no new bulletins is a no-op
//! - the column set is the union of both sides, old columns first, new
//!   columns appended; rows missing a column hold 0 there
//! - within a batch, the first row for a date wins (batches arrive newest
//!   publication first, and the later publication supersedes)
//! - the result is re-sorted ascending by date

use std::collections::HashSet;

use crate::domain::{SeriesRow, TimeSeries};

/// Merge `batch` into `old`, producing the new persisted series.
pub fn merge(old: &TimeSeries, batch: &TimeSeries) -> TimeSeries {
    // Union column schema: old order, then unseen batch columns appended.
    let mut columns = old.columns.clone();
    for col in &batch.columns {
        if !columns.contains(col) {
            columns.push(col.clone());
        }
    }

    let mut rows: Vec<SeriesRow> = old
        .rows
        .iter()
        .map(|r| remap(r, &old.columns, &columns))
        .collect();

    let cutoff = old.last_date();
    let mut seen: HashSet<_> = HashSet::new();
    for row in &batch.rows {
        if let Some(cutoff) = cutoff {
            if row.date <= cutoff {
                continue;
            }
        }
        if !seen.insert(row.date) {
            continue;
        }
        rows.push(remap(row, &batch.columns, &columns));
    }

    rows.sort_by_key(|r| r.date);

    TimeSeries { columns, rows }
}

fn remap(row: &SeriesRow, from: &[String], to: &[String]) -> SeriesRow {
    let values = to
        .iter()
        .map(|col| {
            from.iter()
                .position(|c| c == col)
                .map(|idx| row.values[idx])
                .unwrap_or(0)
        })
        .collect();
    SeriesRow {
        date: row.date,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(columns: &[&str], rows: &[(NaiveDate, &[i64])]) -> TimeSeries {
        TimeSeries {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|(date, values)| SeriesRow {
                    date: *date,
                    values: values.to_vec(),
                })
                .collect(),
        }
    }

    #[test]
    fn empty_batch_leaves_series_unchanged() {
        let old = series(&["a"], &[(ymd(2022, 3, 1), &[5])]);
        let batch = series(&["a"], &[]);
        assert_eq!(merge(&old, &batch), old);
    }

    #[test]
    fn rows_at_or_before_the_watermark_are_dropped() {
        let old = series(&["a"], &[(ymd(2022, 3, 1), &[5]), (ymd(2022, 3, 2), &[6])]);
        let batch = series(
            &["a"],
            &[
                (ymd(2022, 3, 3), &[7]),
                (ymd(2022, 3, 2), &[99]),
                (ymd(2022, 3, 1), &[99]),
            ],
        );
        let merged = merge(&old, &batch);
        assert_eq!(
            merged.rows,
            vec![
                SeriesRow { date: ymd(2022, 3, 1), values: vec![5] },
                SeriesRow { date: ymd(2022, 3, 2), values: vec![6] },
                SeriesRow { date: ymd(2022, 3, 3), values: vec![7] },
            ]
        );
    }

    #[test]
    fn merging_is_idempotent_for_an_already_merged_batch() {
        let old = series(&["a"], &[(ymd(2022, 3, 1), &[5]), (ymd(2022, 3, 2), &[6])]);
        let batch = series(&["a"], &[(ymd(2022, 3, 2), &[6]), (ymd(2022, 3, 1), &[5])]);
        assert_eq!(merge(&old, &batch), old);
    }

    #[test]
    fn new_column_is_zero_filled_for_historical_rows() {
        let old = series(&["a"], &[(ymd(2022, 3, 1), &[5])]);
        let batch = series(&["a", "b"], &[(ymd(2022, 3, 2), &[6, 7])]);
        let merged = merge(&old, &batch);
        assert_eq!(merged.columns, vec!["a", "b"]);
        assert_eq!(merged.rows[0].values, vec![5, 0]);
        assert_eq!(merged.rows[1].values, vec![6, 7]);
    }

    #[test]
    fn historical_column_is_zero_filled_for_new_rows() {
        let old = series(&["a", "b"], &[(ymd(2022, 3, 1), &[5, 9])]);
        let batch = series(&["a"], &[(ymd(2022, 3, 2), &[6])]);
        let merged = merge(&old, &batch);
        assert_eq!(merged.columns, vec!["a", "b"]);
        assert_eq!(merged.rows[1].values, vec![6, 0]);
    }

    #[test]
    fn first_batch_row_for_a_date_wins() {
        let old = series(&["a"], &[]);
        // Newest publication first: the later row for 3/2 is superseded.
        let batch = series(&["a"], &[(ymd(2022, 3, 2), &[10]), (ymd(2022, 3, 2), &[4])]);
        let merged = merge(&old, &batch);
        assert_eq!(merged.rows.len(), 1);
        assert_eq!(merged.rows[0].values, vec![10]);
    }

    #[test]
    fn result_is_sorted_ascending_with_unique_dates() {
        let old = series(&["a"], &[(ymd(2022, 3, 1), &[1])]);
        let batch = series(
            &["a"],
            &[(ymd(2022, 3, 4), &[4]), (ymd(2022, 3, 2), &[2]), (ymd(2022, 3, 3), &[3])],
        );
        let merged = merge(&old, &batch);
        let dates: Vec<_> = merged.rows.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![ymd(2022, 3, 1), ymd(2022, 3, 2), ymd(2022, 3, 3), ymd(2022, 3, 4)]
        );
        for pair in dates.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
