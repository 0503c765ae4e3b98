//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - refreshes the persisted series from the bulletin site
//! - computes derived metrics and the optional forecast
//! - prints reports/plots
//! - writes optional exports

use chrono::{Days, Local, NaiveDate};
use clap::Parser;

use crate::cli::{Command, CommonArgs, PlotArgs, TableArgs, UpdateArgs};
use crate::data::SourceClient;
use crate::domain::{FitSpec, RuleSet, TimeSeries};
use crate::error::AppError;
use crate::io::SeriesStore;

pub mod pipeline;

/// Entry point for the `epi` binary.
pub fn run() -> Result<(), AppError> {
    // We want `epi` and `epi --fit` to behave like `epi plot ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Plot(args) => handle_plot(args),
        Command::Update(args) => handle_update(args),
        Command::Table(args) => handle_table(args),
    }
}

fn handle_update(args: UpdateArgs) -> Result<(), AppError> {
    let rules = load_rules(&args.common)?;
    let store = SeriesStore::new(&args.common.store);
    let client = SourceClient::from_env()?;

    // An explicit `epi update` always crawls.
    let outcome = pipeline::update_series(&store, &client, &rules, today(), true)?;

    if let Some(crawl) = &outcome.crawl {
        print!("{}", crate::report::format_update_summary(crawl, &outcome.series));
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let rules = load_rules(&args.common)?;
    let store = SeriesStore::new(&args.common.store);
    let today = today();

    let series = load_or_refresh(&store, &rules, today, args.force, args.offline)?;
    let since = resolve_since(args.since, args.days, today);

    let fit_spec = args.fit.then(|| {
        let mut spec = FitSpec::for_window_end(args.fit_end);
        spec.horizon_days = args.horizon;
        spec
    });

    let (derived, fit) = pipeline::analyze(&series, since, fit_spec.as_ref());
    let rows = derived.since(since);

    print!(
        "{}",
        crate::plot::render_ascii_plot(
            &rows,
            fit.as_ref().and_then(|f| f.as_ref().ok()),
            args.width,
            args.height,
        )
    );

    match &fit {
        Some(Ok(result)) => {
            print!("\n{}", crate::report::format_forecast(result));
            if let Some(path) = &args.export_forecast {
                crate::io::export::write_forecast_json(path, result)?;
            }
        }
        Some(Err(err)) => print!("\n{}", crate::report::format_forecast_unavailable(err)),
        None => {}
    }

    Ok(())
}

fn handle_table(args: TableArgs) -> Result<(), AppError> {
    let rules = load_rules(&args.common)?;
    let store = SeriesStore::new(&args.common.store);
    let today = today();

    let series = load_or_refresh(&store, &rules, today, false, args.offline)?;
    let (derived, _) = pipeline::analyze(&series, args.since, None);
    let rows = derived.since(args.since);

    print!("{}", crate::report::format_recent_table(&rows, args.rows));
    Ok(())
}

/// Refresh the store when allowed and needed, then hand back the series.
fn load_or_refresh(
    store: &SeriesStore,
    rules: &RuleSet,
    today: NaiveDate,
    force: bool,
    offline: bool,
) -> Result<TimeSeries, AppError> {
    if offline {
        return Ok(store.load()?.unwrap_or_else(|| TimeSeries::new(rules.schema())));
    }
    let client = SourceClient::from_env()?;
    Ok(pipeline::update_series(store, &client, rules, today, force)?.series)
}

fn load_rules(common: &CommonArgs) -> Result<RuleSet, AppError> {
    match &common.rules {
        Some(path) => RuleSet::from_json_file(path),
        None => Ok(RuleSet::bulletin_2022()),
    }
}

fn resolve_since(since: NaiveDate, days: Option<u64>, today: NaiveDate) -> NaiveDate {
    match days.and_then(|d| today.checked_sub_days(Days::new(d))) {
        Some(cutoff) => cutoff,
        None => since,
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Rewrite argv so `epi` defaults to `epi plot`.
///
/// Rules:
/// - `epi`                     -> `epi plot`
/// - `epi --fit ...`           -> `epi plot --fit ...`
/// - `epi --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("plot".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "plot" | "update" | "table");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "plot flags".
    if arg1.starts_with('-') {
        argv.insert(1, "plot".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
