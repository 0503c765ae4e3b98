//! Forecast JSON export.
//!
//! The portable representation of a fit: model coefficients, quality, the
//! projected days, and the optional threshold crossing. Meant for
//! downstream dashboards that re-plot without re-crawling.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{ExpModel, FitQuality, FitResult, Projection, ThresholdCrossing};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub window_end: NaiveDate,
    pub model: ExpModel,
    pub quality: FitQuality,
    pub projections: Vec<Projection>,
    pub threshold: Option<ThresholdCrossing>,
}

/// Write a forecast JSON file.
pub fn write_forecast_json(path: &Path, fit: &FitResult) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::config(format!(
            "Failed to create forecast JSON '{}': {e}",
            path.display()
        ))
    })?;

    let out = ForecastFile {
        tool: "epi".to_string(),
        window_end: fit.window_end,
        model: fit.model.clone(),
        quality: fit.quality.clone(),
        projections: fit.projections.clone(),
        threshold: fit.threshold.clone(),
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::config(format!("Failed to write forecast JSON: {e}")))
}
