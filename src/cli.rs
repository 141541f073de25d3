//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::info;

use crate::adapters::csv_adapter::{CsvAdapter, DEFAULT_DATE_COLUMN};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest::BacktestResult;
use crate::domain::config_validation::{
    self as settings, validate_pipeline_config, validate_run_settings,
};
use crate::domain::error::PipelineError;
use crate::domain::pipeline::{self, PipelineConfig};
use crate::domain::simulation::SimulationConfig;
use crate::domain::validation::validate;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "quantpipe", about = "Moving-average backtest pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline and write a report
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory holding <series>.csv (overrides [data] path)
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        series: Option<String>,
        #[arg(short, long)]
        window: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include the per-step table in the report
        #[arg(long)]
        steps: bool,
    },
    /// Validate the configuration and, if a series is named, its data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        series: Option<String>,
    },
    /// List series available in the data directory
    List {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            data,
            series,
            window,
            output,
            steps,
        } => run_backtest(
            &config,
            data.as_deref(),
            series.as_deref(),
            window,
            output.as_deref(),
            steps,
        ),
        Command::Validate { config, series } => run_validate(&config, series.as_deref()),
        Command::List { config } => run_list(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PipelineError> {
    FileConfigAdapter::from_file(path)
}

pub fn build_pipeline_config(adapter: &dyn ConfigPort) -> Result<PipelineConfig, PipelineError> {
    Ok(PipelineConfig {
        simulation: SimulationConfig {
            window: settings::window(adapter)?,
            ma_edge: settings::ma_edge(adapter)?,
            first_return: settings::first_return(adapter)?,
            lag_signal: adapter.get_bool("simulation", "lag_signal", false),
        },
        deadline: settings::deadline(adapter)?,
        fill_missing: adapter.get_bool("pipeline", "fill_missing", false),
    })
}

/// Command-line override first, then `[data] series`.
pub fn resolve_series(
    series_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, PipelineError> {
    series_override
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| config.get_string("data", "series").map(|s| s.trim().to_string()))
        .ok_or_else(|| PipelineError::ConfigMissing {
            section: "data".into(),
            key: "series".into(),
        })
}

/// Build the CSV adapter from `[data]`, with an optional directory override.
pub fn build_data_adapter(
    data_override: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<CsvAdapter, PipelineError> {
    let base = match data_override {
        Some(p) => p.to_path_buf(),
        None => config
            .get_string("data", "path")
            .map(PathBuf::from)
            .ok_or_else(|| PipelineError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            })?,
    };
    let date_column = config
        .get_string("data", "date_column")
        .unwrap_or_else(|| DEFAULT_DATE_COLUMN.to_string());
    Ok(CsvAdapter::new(base).with_date_column(&date_column))
}

/// Fetch a series through the data port and run the pipeline on it.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    series_name: &str,
    config: &PipelineConfig,
) -> Result<BacktestResult, PipelineError> {
    let series = data_port.fetch_series(series_name)?;
    info!(
        series = series_name,
        rows = series.len(),
        columns = series.columns.len(),
        "loaded series"
    );
    pipeline::run(series, config)
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    series_override: Option<&str>,
    window_override: Option<usize>,
    output_override: Option<&Path>,
    include_steps: bool,
) -> Result<(), PipelineError> {
    info!(path = %config_path.display(), "loading config");
    let adapter = load_config(config_path)?;
    if data_override.is_some() {
        validate_run_settings(&adapter)?;
    } else {
        validate_pipeline_config(&adapter)?;
    }

    let mut config = build_pipeline_config(&adapter)?;
    if let Some(window) = window_override {
        if window == 0 {
            return Err(PipelineError::ConfigInvalid {
                section: "simulation".into(),
                key: "window".into(),
                reason: "--window must be a positive integer".into(),
            });
        }
        config.simulation.window = window;
    }

    let series_name = resolve_series(series_override, &adapter)?;
    let data = build_data_adapter(data_override, &adapter)?;
    let result = run_backtest_pipeline(&data, &series_name, &config)?;

    let report = TextReportAdapter::new(include_steps);
    let output = output_override
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "output").map(PathBuf::from));
    match output {
        Some(path) => {
            report.write(&result, &series_name, &path)?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{}", report.render(&result, &series_name)),
    }
    Ok(())
}

fn run_validate(config_path: &Path, series_override: Option<&str>) -> Result<(), PipelineError> {
    info!(path = %config_path.display(), "validating config");
    let adapter = load_config(config_path)?;
    validate_pipeline_config(&adapter)?;
    build_pipeline_config(&adapter)?;

    let series_name = match series_override {
        Some(s) => Some(resolve_series(Some(s), &adapter)?),
        None => adapter.get_string("data", "series"),
    };

    if let Some(name) = series_name {
        let data = build_data_adapter(None, &adapter)?;
        let series = validate(data.fetch_series(&name)?)?;
        println!(
            "Series '{}' is valid: {} rows, {} columns",
            name,
            series.len(),
            series.columns.len()
        );
    }

    println!("Configuration is valid.");
    Ok(())
}

fn run_list(config_path: &Path) -> Result<(), PipelineError> {
    let adapter = load_config(config_path)?;
    let data = build_data_adapter(None, &adapter)?;
    for name in data.list_series()? {
        println!("{}", name);
    }
    Ok(())
}
