//! Command-line parsing for the bulletin tracker.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the crawl/series/fit code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "epi",
    version,
    about = "Shanghai COVID-19 bulletin tracker and trend fitter"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Refresh the series if needed, then chart it (default command).
    Plot(PlotArgs),
    /// Crawl new bulletins and rewrite the persisted series.
    Update(UpdateArgs),
    /// Print the recent-days table.
    Table(TableArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Parser, Clone)]
pub struct CommonArgs {
    /// Path of the persisted CSV store.
    #[arg(long, default_value = "shanghai_covid19_data.csv")]
    pub store: PathBuf,

    /// Counter rules JSON; defaults to the built-in 2022 bulletin era.
    #[arg(long, value_name = "JSON")]
    pub rules: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Parser)]
pub struct PlotArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Show rows after this date.
    #[arg(long, default_value = "2022-02-28")]
    pub since: NaiveDate,

    /// Show the last N days instead of a fixed --since date.
    #[arg(long, conflicts_with = "since")]
    pub days: Option<u64>,

    /// Re-crawl even if the store was already refreshed today.
    #[arg(long)]
    pub force: bool,

    /// Never crawl; chart whatever the store already holds.
    #[arg(long, conflicts_with = "force")]
    pub offline: bool,

    /// Fit the exponential trend and project it forward.
    #[arg(long)]
    pub fit: bool,

    /// Fit window end, exclusive.
    #[arg(long, default_value = "2022-03-30")]
    pub fit_end: NaiveDate,

    /// Projection horizon (days past the fit window).
    #[arg(long, default_value_t = 5)]
    pub horizon: usize,

    /// Export the fit (model + projections) to JSON.
    #[arg(long = "export-forecast", value_name = "JSON")]
    pub export_forecast: Option<PathBuf>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Parser)]
pub struct TableArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Show rows after this date.
    #[arg(long, default_value = "2022-02-28")]
    pub since: NaiveDate,

    /// Cap the table at the most recent N rows.
    #[arg(long, default_value_t = 32)]
    pub rows: usize,

    /// Never crawl; print whatever the store already holds.
    #[arg(long)]
    pub offline: bool,
}
