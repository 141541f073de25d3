//! Sequential pipeline: validate -> analyze -> simulate -> aggregate.
//!
//! Each stage finishes before the next starts. Stage start/end are reported
//! as `tracing` events, and an optional deadline is checked at every stage
//! boundary (never mid-stage).

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::domain::analysis::analyze;
use crate::domain::backtest::{aggregate, BacktestResult};
use crate::domain::error::{PipelineError, Stage};
use crate::domain::preprocess::fill_missing_with_mean;
use crate::domain::series::Series;
use crate::domain::simulation::{simulate, SimulationConfig};
use crate::domain::validation::validate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub simulation: SimulationConfig,
    pub deadline: Option<Duration>,
    pub fill_missing: bool,
}

struct Clock {
    started: Instant,
    deadline: Option<Duration>,
}

impl Clock {
    fn check(&self, next: Stage) -> Result<(), PipelineError> {
        match self.deadline {
            Some(limit) if self.started.elapsed() >= limit => {
                Err(PipelineError::DeadlineExceeded { stage: next })
            }
            _ => Ok(()),
        }
    }
}

fn run_stage<T>(
    clock: &Clock,
    stage: Stage,
    f: impl FnOnce() -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    clock.check(stage)?;
    info!(%stage, "stage started");
    let started = Instant::now();
    match f() {
        Ok(value) => {
            info!(
                %stage,
                elapsed_us = started.elapsed().as_micros() as u64,
                "stage finished"
            );
            Ok(value)
        }
        Err(e) => {
            error!(%stage, error = %e, "stage failed");
            Err(e)
        }
    }
}

pub fn run(series: Series, config: &PipelineConfig) -> Result<BacktestResult, PipelineError> {
    let clock = Clock {
        started: Instant::now(),
        deadline: config.deadline,
    };
    info!(rows = series.len(), columns = series.columns.len(), "pipeline run");

    let series = run_stage(&clock, Stage::Validate, || {
        let series = validate(series)?;
        Ok(if config.fill_missing {
            fill_missing_with_mean(series)
        } else {
            series
        })
    })?;

    let analysis = run_stage(&clock, Stage::Analyze, || Ok(Arc::new(analyze(&series))))?;

    let simulation = run_stage(&clock, Stage::Simulate, || {
        simulate(&series, &config.simulation).map(Arc::new)
    })?;

    run_stage(&clock, Stage::Aggregate, || aggregate(analysis, simulation))
}
