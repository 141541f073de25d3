//! Configuration validation.
//!
//! Validates all config fields before a pipeline run. The per-setting readers
//! are public so the CLI builds its run config from the same checks.

use std::time::Duration;

use crate::domain::error::PipelineError;
use crate::domain::simulation::{FirstReturn, MaEdgePolicy, DEFAULT_WINDOW};
use crate::ports::config_port::ConfigPort;

pub fn validate_pipeline_config(config: &dyn ConfigPort) -> Result<(), PipelineError> {
    validate_data_path(config)?;
    validate_run_settings(config)
}

/// Everything except `[data] path`, for runs where the data directory is
/// supplied on the command line.
pub fn validate_run_settings(config: &dyn ConfigPort) -> Result<(), PipelineError> {
    window(config)?;
    ma_edge(config)?;
    first_return(config)?;
    deadline(config)?;
    Ok(())
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), PipelineError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(PipelineError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> PipelineError {
    PipelineError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// `[simulation] window`, defaulting to [`DEFAULT_WINDOW`].
pub fn window(config: &dyn ConfigPort) -> Result<usize, PipelineError> {
    let value = config.get_int("simulation", "window", DEFAULT_WINDOW as i64);
    usize::try_from(value)
        .ok()
        .filter(|w| *w > 0)
        .ok_or_else(|| invalid("simulation", "window", "window must be a positive integer"))
}

pub fn ma_edge(config: &dyn ConfigPort) -> Result<MaEdgePolicy, PipelineError> {
    match config.get_string("simulation", "ma_edge") {
        Some(s) => s
            .parse()
            .map_err(|reason: String| invalid("simulation", "ma_edge", reason)),
        None => Ok(MaEdgePolicy::default()),
    }
}

pub fn first_return(config: &dyn ConfigPort) -> Result<FirstReturn, PipelineError> {
    match config.get_string("simulation", "first_return") {
        Some(s) => s
            .parse()
            .map_err(|reason: String| invalid("simulation", "first_return", reason)),
        None => Ok(FirstReturn::default()),
    }
}

/// `[pipeline] deadline_ms`; zero or absent means no deadline.
pub fn deadline(config: &dyn ConfigPort) -> Result<Option<Duration>, PipelineError> {
    match u64::try_from(config.get_int("pipeline", "deadline_ms", 0)) {
        Ok(0) => Ok(None),
        Ok(ms) => Ok(Some(Duration::from_millis(ms))),
        Err(_) => Err(invalid(
            "pipeline",
            "deadline_ms",
            "deadline_ms must be non-negative",
        )),
    }
}
