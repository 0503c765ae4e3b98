//! Low-level fitting of `y = a * exp(b * x) + c`.
//!
//! Given day offsets `x_i` and observed daily counts `y_i`, we search a
//! grid of growth rates `b`. For each candidate `b` the model is linear in
//! `(a, c)`, so we solve a two-column least squares problem and keep the
//! candidate with the lowest SSE; a second, finer grid pass around the
//! winner sharpens `b`.
//!
//! Candidates whose design matrix overflows (`exp(b*x)` non-finite) or is
//! too ill-conditioned to solve simply drop out. If every candidate drops
//! out, the fit has failed to converge and the caller is expected to skip
//! the forecast, not to crash.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::domain::{ExpModel, FitQuality};
use crate::error::AppError;
use crate::fit::grid::lin_space;
use crate::math::solve_least_squares;

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    model: ExpModel,
    sse: f64,
}

/// Fit the exponential trend over `(xs, ys)` with a two-pass grid search
/// for `b` in `[b_min, b_max]`.
pub fn fit_exponential(
    xs: &[f64],
    ys: &[f64],
    b_min: f64,
    b_max: f64,
    b_steps: usize,
) -> Result<(ExpModel, FitQuality), AppError> {
    if xs.len() != ys.len() {
        return Err(AppError::fit("Mismatched x/y lengths."));
    }
    if xs.len() < 3 {
        return Err(AppError::fit(format!(
            "Fit window has {} points; at least 3 are required.",
            xs.len()
        )));
    }

    let coarse = lin_space(b_min, b_max, b_steps)?;
    let best = fit_once(xs, ys, &coarse)?;

    // Refine around the winner at one coarse-step resolution.
    let step = (b_max - b_min) / (b_steps as f64 - 1.0);
    let refined_grid = lin_space(best.model.b - step, best.model.b + step, b_steps)?;
    let best = match fit_once(xs, ys, &refined_grid) {
        Ok(refined) if refined.sse <= best.sse => refined,
        // The coarse winner stands if refinement finds nothing better.
        _ => best,
    };

    let n = xs.len();
    let quality = FitQuality {
        sse: best.sse,
        rmse: (best.sse / n as f64).sqrt(),
        n,
    };
    Ok((best.model, quality))
}

fn fit_once(xs: &[f64], ys: &[f64], grid: &[f64]) -> Result<Candidate, AppError> {
    // Evaluate each growth-rate candidate independently (parallel).
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &b)| evaluate_candidate(xs, ys, b).map(|(model, sse)| Candidate {
            idx,
            model,
            sse,
        }))
        .collect();

    if candidates.is_empty() {
        return Err(AppError::fit(
            "Trend fit did not converge: no usable growth-rate candidate.",
        ));
    }

    // Deterministic selection: minimum SSE, ties broken by grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }

    Ok(best.clone())
}

fn evaluate_candidate(xs: &[f64], ys: &[f64], b: f64) -> Option<(ExpModel, f64)> {
    let n = xs.len();

    // Design matrix [exp(b*x), 1].
    let mut design = DMatrix::<f64>::zeros(n, 2);
    let mut y = DVector::<f64>::zeros(n);
    for i in 0..n {
        let g = (b * xs[i]).exp();
        if !g.is_finite() {
            return None;
        }
        design[(i, 0)] = g;
        design[(i, 1)] = 1.0;
        y[i] = ys[i];
    }

    let beta = solve_least_squares(&design, &y)?;
    let model = ExpModel {
        a: beta[0],
        b,
        c: beta[1],
    };

    let mut sse = 0.0;
    for i in 0..n {
        let r = ys[i] - model.predict(xs[i]);
        sse += r * r;
    }

    if sse.is_finite() { Some((model, sse)) } else { None }
}
