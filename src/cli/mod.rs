//! Command-line parsing for the COVID-19 dashboard.
//!
//! Argument parsing and command dispatch stay separate from ingestion and
//! query code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::SourceId;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covid", version, about = "COVID-19 daily dashboard (CSV time series)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the dashboard for one date (latest by default), optionally plot/export.
    View(ViewArgs),
    /// Load sources and print per-source row diagnostics.
    Sources(SourceArgs),
}

/// Where to read the CSV extracts from, and which ones.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Directory holding the CSV extracts (default: $COVID_DATA_DIR, then `data`).
    #[arg(long, value_name = "DIR", conflicts_with = "url")]
    pub data_dir: Option<PathBuf>,

    /// Base URL serving the CSV extracts (default: $COVID_DATA_URL).
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Sources to load (comma-separated).
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [
            SourceId::InfectionTrend,
            SourceId::DeathsCumulative,
            SourceId::CumulativeCases,
            SourceId::AgeGroups,
        ]
    )]
    pub sources: Vec<SourceId>,
}

/// Options for the dashboard view.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Date to show (YYYY-MM-DD). Defaults to the latest record.
    #[arg(long, value_parser = parse_iso_date, conflicts_with = "index")]
    pub date: Option<NaiveDate>,

    /// Index into the infection series (slider position).
    #[arg(long, allow_negative_numbers = true)]
    pub index: Option<isize>,

    /// Records in the trend slice.
    #[arg(long, default_value_t = 30)]
    pub trend_days: usize,

    /// Records summed for the recent age breakdown.
    #[arg(long, default_value_t = 30)]
    pub age_days: usize,

    /// Prefectures shown in the ranking.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 90)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 18)]
    pub height: usize,

    /// Export the view to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the trend slice to CSV.
    #[arg(long = "export-trend")]
    pub export_trend: Option<PathBuf>,
}

fn parse_iso_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
