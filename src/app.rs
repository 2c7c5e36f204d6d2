//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches EIA data and persists it as CSV
//! - runs the ingest -> filter -> resample -> derive pipeline
//! - prints reports/charts
//! - writes optional exports
//! - launches the TUI

use chrono::NaiveDate;
use clap::Parser;

use crate::cli::{
    Command, FetchArgs, FlowsArgs, HealthArgs, SpotArgs, SummaryArgs, TuiArgs,
};
use crate::domain::DerivedSeries;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `crude` binary.
pub fn run() -> Result<(), AppError> {
    // We want `crude` and `crude --data-dir d` to behave like `crude tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Spot(args) => handle_spot(args),
        Command::Summary(args) => handle_summary(args),
        Command::Flows(args) => handle_flows(args),
        Command::Health(args) => handle_health(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let outcomes = pipeline::run_fetch(&args.data_dir)?;
    for outcome in &outcomes {
        println!(
            "{}: {} rows -> {}",
            outcome.dataset.display_name(),
            outcome.rows,
            outcome.path.display()
        );
    }
    Ok(())
}

fn handle_spot(args: SpotArgs) -> Result<(), AppError> {
    let data = pipeline::DashboardData::load(&args.data_dir)?;
    let params = pipeline::SpotParams {
        window: args.window,
        frequency: args.frequency,
        mean_window: args.mean_window,
        vol_window: args.vol_window,
    };
    let view = pipeline::spot_view(&data, &params)?;

    println!("{}", crate::report::format_spot_summary(&view, &params));

    if !args.no_plot {
        let brent = chart_points(&view.brent);
        let wti = chart_points(&view.wti);
        let chart = crate::plot::render_ascii_chart(
            "Spot prices",
            "$/bbl",
            &[
                crate::plot::AsciiSeries {
                    label: "Brent",
                    marker: 'B',
                    points: &brent,
                },
                crate::plot::AsciiSeries {
                    label: "WTI",
                    marker: 'W',
                    points: &wti,
                },
            ],
            args.width,
            args.height,
        );
        println!("{chart}");
    }

    if let Some(path) = &args.export {
        crate::io::export::write_spot_csv(path, &view.brent, &view.wti, &view.spread)?;
        println!("Exported spot series to {}", path.display());
    }

    Ok(())
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let data = pipeline::DashboardData::load(&args.data_dir)?;
    let params = pipeline::SupplyDemandParams {
        dataset: args.dataset,
        window: args.window,
        countries: args.countries,
        trailing_months: args.trailing_months,
    };
    let view = pipeline::supply_demand_view(&data, &params)?;

    println!("{}", crate::report::format_supply_summary(&view, &params));
    Ok(())
}

fn handle_flows(args: FlowsArgs) -> Result<(), AppError> {
    let data = pipeline::DashboardData::load(&args.data_dir)?;
    let params = pipeline::FlowsParams {
        year: args.year,
        origins: args.origins,
    };
    let view = pipeline::flows_view(&data, &params);

    println!("{}", crate::report::format_flow_summary(&view));
    Ok(())
}

fn handle_health(args: HealthArgs) -> Result<(), AppError> {
    let data = pipeline::DashboardData::load(&args.data_dir)?;
    let path = crate::debug::write_health_bundle(&args.out_dir, &data)?;
    println!("Wrote health bundle to {}", path.display());
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let theme = crate::config::Theme::load(&args.config)?;
    crate::tui::run(&args.data_dir, theme)
}

/// Null observations never reach the chart grid.
fn chart_points(series: &DerivedSeries) -> Vec<(NaiveDate, f64)> {
    series
        .points
        .iter()
        .filter_map(|p| p.value.map(|v| (p.period, v)))
        .collect()
}

/// Rewrite argv so `crude` defaults to `crude tui`.
///
/// Rules:
/// - `crude`                      -> `crude tui`
/// - `crude --data-dir d ...`     -> `crude tui --data-dir d ...`
/// - `crude --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "fetch" | "spot" | "summary" | "flows" | "health" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
