//! Command-line parsing for the crude-oil dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{Dataset, Frequency, TimeWindow};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "crude", version, about = "Crude Oil Market Dashboard (EIA-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch all datasets from the EIA API and persist them as CSV.
    Fetch(FetchArgs),
    /// Print the spot-price report and chart, and optionally export the series.
    Spot(SpotArgs),
    /// Print the supply/demand report for one dataset.
    Summary(SummaryArgs),
    /// Print the US import-flow report.
    Flows(FlowsArgs),
    /// Write a data-health bundle (row issues, coverage) to a markdown file.
    Health(HealthArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as the report subcommands, but
    /// renders the views in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

/// Options for `crude fetch`.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// Directory the CSV files are written to.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
}

/// Options for the spot-price report.
#[derive(Debug, Parser, Clone)]
pub struct SpotArgs {
    /// Directory the CSV files are read from.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Trailing window (1W, 1M, 3M, 6M, YTD, 1Y, 5Y, 10Y, Max; long
    /// spellings like "Last 5 Years" and "All" also work).
    #[arg(short = 'w', long, value_parser = TimeWindow::parse_token, default_value_t = TimeWindow::M6)]
    pub window: TimeWindow,

    /// Down-sampling frequency (daily, weekly, monthly).
    #[arg(short = 'f', long, value_parser = Frequency::parse_token, default_value_t = Frequency::Daily)]
    pub frequency: Frequency,

    /// Rolling-mean window (observations).
    #[arg(long, default_value_t = 20)]
    pub mean_window: usize,

    /// Rolling-volatility window over percent changes (observations).
    #[arg(long, default_value_t = 20)]
    pub vol_window: usize,

    /// Chart width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Disable the terminal chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Export the derived spot series to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for the supply/demand report.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// Directory the CSV files are read from.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Dataset to report on.
    #[arg(short = 'd', long, value_enum, ignore_case = true, default_value_t = Dataset::Production)]
    pub dataset: Dataset,

    /// Trailing window (1W, 1M, 3M, 6M, YTD, 1Y, 5Y, 10Y, Max; long
    /// spellings like "Last 5 Years" and "All" also work).
    #[arg(short = 'w', long, value_parser = TimeWindow::parse_token, default_value_t = TimeWindow::Y5)]
    pub window: TimeWindow,

    /// Country to include (repeatable); defaults to United States + OPEC.
    #[arg(short = 'c', long = "country")]
    pub countries: Vec<String>,

    /// Trailing window for the ranking, in months.
    #[arg(long, default_value_t = 12)]
    pub trailing_months: u32,
}

/// Options for the import-flow report.
#[derive(Debug, Parser, Clone)]
pub struct FlowsArgs {
    /// Directory the CSV files are read from.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Calendar year to show; defaults to the latest year present.
    #[arg(short = 'y', long)]
    pub year: Option<i32>,

    /// Origin country to include (repeatable); defaults to all origins.
    #[arg(long = "origin")]
    pub origins: Vec<String>,
}

/// Options for the data-health bundle.
#[derive(Debug, Parser, Clone)]
pub struct HealthArgs {
    /// Directory the CSV files are read from.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory the bundle is written to.
    #[arg(long, default_value = "debug")]
    pub out_dir: PathBuf,
}

/// Options for the TUI.
#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    /// Directory the CSV files are read from.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Theme configuration file (TOML).
    #[arg(long, default_value = "crude.toml")]
    pub config: PathBuf,
}
