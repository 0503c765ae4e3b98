//! The persisted time-series store.
//!
//! One CSV file, one row per date, first column the date, remaining columns
//! the counter schema. The file is loaded fully into memory and rewritten
//! fully on save; the series is a few hundred rows at most and a partial
//! append could not repair column-set growth anyway.
//!
//! Two date formats are accepted at load time (`%m/%d/%Y` from early
//! spreadsheet-edited files, ISO `%Y-%m-%d` from this tool). Anything else
//! is fatal: guessing at dates would corrupt history silently.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};

use crate::domain::rules::columns;
use crate::domain::{SeriesRow, TimeSeries};
use crate::error::AppError;

pub struct SeriesStore {
    path: PathBuf,
}

impl SeriesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// True when the file is missing or was last written before `today`.
    /// Drives the "refresh at most once a day unless forced" behavior.
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        let Ok(meta) = std::fs::metadata(&self.path) else {
            return true;
        };
        let Ok(modified) = meta.modified() else {
            return true;
        };
        DateTime::<Local>::from(modified).date_naive() < today
    }

    /// Load the series, or `None` if the store file does not exist yet.
    pub fn load(&self) -> Result<Option<TimeSeries>, AppError> {
        if !self.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path).map_err(|e| {
            AppError::store(format!("Failed to open store '{}': {e}", self.path.display()))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| AppError::store(format!("Failed to read store headers: {e}")))?
            .clone();

        if headers.get(0) != Some(columns::DATE) {
            return Err(AppError::store(format!(
                "Store '{}' does not start with a {} column.",
                self.path.display(),
                columns::DATE
            )));
        }

        let cols: Vec<String> = headers.iter().skip(1).map(|h| h.to_string()).collect();
        let mut rows = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            let line = idx + 2;
            let record = result
                .map_err(|e| AppError::store(format!("Store line {line}: {e}")))?;
            let raw_date = record.get(0).unwrap_or("");
            let date = parse_store_date(raw_date)
                .map_err(|e| AppError::store(format!("Store line {line}: {e}")))?;

            let mut values = Vec::with_capacity(cols.len());
            for i in 0..cols.len() {
                values.push(parse_count(record.get(i + 1).unwrap_or("")));
            }
            rows.push(SeriesRow { date, values });
        }

        Ok(Some(TimeSeries { columns: cols, rows }))
    }

    /// Rewrite the store. Dates are always written in ISO format.
    pub fn save(&self, series: &TimeSeries) -> Result<(), AppError> {
        let file = File::create(&self.path).map_err(|e| {
            AppError::store(format!("Failed to create store '{}': {e}", self.path.display()))
        })?;

        let mut writer = csv::Writer::from_writer(file);

        let mut header = Vec::with_capacity(series.columns.len() + 1);
        header.push(columns::DATE.to_string());
        header.extend(series.columns.iter().cloned());
        writer
            .write_record(&header)
            .map_err(|e| AppError::store(format!("Failed to write store header: {e}")))?;

        for row in &series.rows {
            let mut record = Vec::with_capacity(row.values.len() + 1);
            record.push(row.date.format("%Y-%m-%d").to_string());
            record.extend(row.values.iter().map(|v| v.to_string()));
            writer
                .write_record(&record)
                .map_err(|e| AppError::store(format!("Failed to write store row: {e}")))?;
        }

        writer
            .flush()
            .map_err(|e| AppError::store(format!("Failed to flush store: {e}")))
    }
}

/// Parse a persisted date in either accepted format.
pub fn parse_store_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    let format = if raw.contains('/') {
        "%m/%d/%Y"
    } else if raw.contains('-') {
        "%Y-%m-%d"
    } else {
        return Err(AppError::store(format!(
            "Unrecognized date format '{raw}' (expected m/d/Y or Y-m-d)."
        )));
    };
    NaiveDate::parse_from_str(raw, format)
        .map_err(|e| AppError::store(format!("Invalid date '{raw}': {e}")))
}

/// Counts are integers, but files touched by spreadsheets or older tooling
/// may hold them as floats ("15.0"); missing trailing cells read as 0.
fn parse_count(raw: &str) -> i64 {
    if raw.is_empty() {
        return 0;
    }
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|v| v.round() as i64))
        .unwrap_or(0)
}
