//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed daily new infections: `o`
//! - fitted trend and its projection: `-` line
//!
//! The x axis is the day offset within the display window, which is also
//! the fitter's offset axis, so the curve overlays the points it was fit
//! to and then continues past them into the projected days.

use crate::domain::{DerivedRow, FitResult};

/// Render the daily-new-infections chart, with the fitted/projected trend
/// overlaid when a fit is available.
pub fn render_ascii_plot(
    rows: &[&DerivedRow],
    fit: Option<&FitResult>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let observed: Vec<(f64, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, r.new_total as f64))
        .collect();

    // The curve spans the observed offsets plus the projected days.
    let curve: Vec<(f64, f64)> = match fit {
        Some(fit) => {
            let last = observed.len().saturating_sub(1) + fit.projections.len();
            (0..=last)
                .map(|i| (i as f64, fit.model.predict(i as f64)))
                .collect()
        }
        None => Vec::new(),
    };

    let x_max = curve
        .last()
        .map(|&(x, _)| x)
        .unwrap_or_else(|| observed.len().saturating_sub(1) as f64)
        .max(1.0);

    let (y_min, y_max) = y_range(&observed, &curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the curve first so observed points overlay it.
    draw_curve(&mut grid, &curve, x_max, y_min, y_max);
    for &(x, y) in &observed {
        let col = map_x(x, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    let date_span = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => format!("{} .. {}", first.date, last.date),
        _ => "(empty)".to_string(),
    };
    out.push_str(&format!(
        "Daily new infections: {date_span} | y=[{y_min:.0}, {y_max:.0}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn y_range(observed: &[(f64, f64)], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in observed.iter().chain(curve.iter()) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (x / x_max).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let col = map_x(x, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(date: NaiveDate, new_total: i64) -> DerivedRow {
        DerivedRow {
            date,
            local_confirmed: new_total,
            local_asymptomatic: 0,
            imported_confirmed: 0,
            imported_asymptomatic: 0,
            recovered: 0,
            released: 0,
            in_hospital: 0,
            deaths: 0,
            reclassified: 0,
            quarantine_confirmed: 0,
            quarantine_asymptomatic: 0,
            confirmed: new_total,
            asymptomatic: 0,
            cum_confirmed: 0,
            cum_asymptomatic: 0,
            cum_infections: 0,
            cum_recovered: 0,
            cum_released: 0,
            under_observation: 0,
            confirmed_rate_pct: 100.0,
            new_total,
            new_controlled_total: 0,
            new_wild_total: new_total,
            wild_ratio_pct: 100.0,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let d1 = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2022, 3, 10).unwrap();
        let rows = [row(d1, 100), row(d2, 110)];
        let refs: Vec<&DerivedRow> = rows.iter().collect();

        let txt = render_ascii_plot(&refs, None, 10, 5);
        let expected = concat!(
            "Daily new infections: 2022-03-01 .. 2022-03-10 | y=[100, 110]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn fitted_curve_extends_past_the_observed_points() {
        let d1 = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2022, 3, 2).unwrap();
        let rows = [row(d1, 10), row(d2, 10)];
        let refs: Vec<&DerivedRow> = rows.iter().collect();

        let fit = FitResult {
            model: crate::domain::ExpModel { a: 0.0, b: 0.0, c: 10.0 },
            quality: crate::domain::FitQuality { sse: 0.0, rmse: 0.0, n: 2 },
            window_start_index: 0,
            window_end: d2,
            projections: vec![crate::domain::Projection { date: d2, value: 10.0 }],
            threshold: None,
        };

        let txt = render_ascii_plot(&refs, Some(&fit), 12, 5);
        // Flat model: a horizontal dashed line across the whole width, with
        // observed points overlaid on the left portion.
        let line = txt.lines().nth(3).unwrap();
        assert!(line.contains('-'));
        assert!(line.starts_with('o'));
    }
}
