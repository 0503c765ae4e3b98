//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the column schema and counter rule set (`columns`, `RuleSet`)
//! - bulletin-level types (`IndexEntry`, `BulletinEntry`)
//! - the persisted time series (`TimeSeries`, `SeriesRow`)
//! - derived metrics (`DerivedSeries`, `DerivedRow`)
//! - fit outputs (`FitResult`, `ExpModel`, `Projection`)

pub mod rules;
pub mod types;

pub use rules::*;
pub use types::*;
