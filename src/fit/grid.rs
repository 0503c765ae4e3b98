//! Growth-rate grid generation.
//!
//! The exponential trend is calibrated by a deterministic grid search over
//! the growth rate `b`.
//!
//! Why grid search?
//! - It avoids the local-minima and divergence issues of unconstrained
//!   nonlinear optimization on noisy daily counts.
//! - It is deterministic given the same inputs/flags.
//! - With one nonlinear parameter, a modest grid plus one refinement pass
//!   is plenty for a daily batch job.

use crate::error::AppError;

/// Generate `steps` evenly spaced points between `min` and `max`
/// (inclusive). `b` can be negative (a shrinking outbreak), so the grid is
/// linear, not logarithmic.
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::config(format!(
            "Invalid growth-rate range: min={min}, max={max} (must be finite and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::config("Growth-rate steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push(min + step * i as f64);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lin_space_includes_endpoints() {
        let v = lin_space(-1.0, 1.0, 5).unwrap();
        assert!((v[0] + 1.0).abs() < 1e-12);
        assert!((v[v.len() - 1] - 1.0).abs() < 1e-12);
        assert_eq!(v.len(), 5);
    }

    #[test]
    fn lin_space_rejects_degenerate_ranges() {
        assert!(lin_space(1.0, 1.0, 5).is_err());
        assert!(lin_space(0.0, 1.0, 1).is_err());
    }
}
