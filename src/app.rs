//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - installs logging
//! - parses CLI arguments
//! - picks a byte source (flag, environment, or default directory)
//! - loads the requested sources and builds the dashboard view
//! - prints the view/plot and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, SourceArgs, ViewArgs};
use crate::data::{DATA_DIR_ENV, DATA_URL_ENV, DEFAULT_DATA_DIR, DirSource, HttpSource, SourceReader};
use crate::domain::ViewConfig;
use crate::error::AppError;

pub mod pipeline;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "covid_dash=info";

/// Entry point for the `covid` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    // `covid` and `covid --date ...` behave like `covid view ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::View(args) => handle_view(args),
        Command::Sources(args) => handle_sources(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // Ignore the error when a subscriber is already installed (tests, embedding).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_view(args: ViewArgs) -> Result<(), AppError> {
    let reader = reader_from_args(&args.source)?;
    let config = view_config_from_args(&args);
    let run = pipeline::run_view(reader.as_ref(), &args.source.sources, &config)?;

    println!("{}", crate::report::format_view(&run.view));

    if config.plot {
        let plot = crate::plot::render_trend_plot(&run.view.trend, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if let Some(path) = &config.export_json {
        crate::io::export::write_view_json(path, &run.view)?;
    }
    if let Some(path) = &config.export_trend {
        crate::io::export::write_trend_csv(path, &run.view.trend)?;
    }

    Ok(())
}

fn handle_sources(args: SourceArgs) -> Result<(), AppError> {
    let reader = reader_from_args(&args)?;
    let dataset = pipeline::load(reader.as_ref(), &args.sources)?;
    print!("{}", crate::report::format_sources(&dataset));
    Ok(())
}

/// Pick the byte source: `--url`, `--data-dir`, then `.env`/environment, then `data/`.
pub fn reader_from_args(args: &SourceArgs) -> Result<Box<dyn SourceReader>, AppError> {
    if let Some(url) = &args.url {
        return Ok(Box::new(HttpSource::new(url.clone())));
    }
    if let Some(dir) = &args.data_dir {
        return Ok(Box::new(DirSource::new(dir.clone())));
    }

    dotenvy::dotenv().ok();
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(Box::new(DirSource::new(dir)));
    }
    if std::env::var_os(DATA_URL_ENV).is_some() {
        return Ok(Box::new(HttpSource::from_env()?));
    }
    Ok(Box::new(DirSource::new(DEFAULT_DATA_DIR)))
}

pub fn view_config_from_args(args: &ViewArgs) -> ViewConfig {
    ViewConfig {
        date: args.date,
        index: args.index,
        trend_days: args.trend_days,
        age_days: args.age_days,
        top_n: args.top,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_json: args.export.clone(),
        export_trend: args.export_trend.clone(),
    }
}

/// Rewrite argv so `covid` defaults to `covid view`.
///
/// Rules:
/// - `covid`                      -> `covid view`
/// - `covid --date 2021-08-20`    -> `covid view --date 2021-08-20`
/// - `covid --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("view".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "view" | "sources");
    if is_subcommand {
        return argv;
    }

    // A leading flag is a view flag.
    if arg1.starts_with('-') {
        argv.insert(1, "view".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_view() {
        assert_eq!(rewrite_args(argv(&["covid"])), argv(&["covid", "view"]));
        assert_eq!(
            rewrite_args(argv(&["covid", "--top", "5"])),
            argv(&["covid", "view", "--top", "5"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["covid", "sources"])), argv(&["covid", "sources"]));
        assert_eq!(rewrite_args(argv(&["covid", "--help"])), argv(&["covid", "--help"]));
    }

    #[test]
    fn flags_map_onto_view_config() {
        let cli = crate::cli::Cli::parse_from(["covid", "view", "--no-plot", "--index", "-1", "--top", "3"]);
        let Command::View(args) = cli.command else {
            panic!("expected view");
        };
        let config = view_config_from_args(&args);
        assert!(!config.plot);
        assert_eq!(config.index, Some(-1));
        assert_eq!(config.top_n, 3);
        assert_eq!(config.trend_days, ViewConfig::default().trend_days);
    }

    #[test]
    fn explicit_dir_wins() {
        let cli = crate::cli::Cli::parse_from(["covid", "sources", "--data-dir", "/tmp/extracts"]);
        let Command::Sources(args) = cli.command else {
            panic!("expected sources");
        };
        let reader = reader_from_args(&args).unwrap();
        assert_eq!(reader.describe(), "dir:/tmp/extracts");
    }
}
