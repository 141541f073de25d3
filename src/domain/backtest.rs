//! Backtest aggregation.
//!
//! [`BacktestResult`] shares the upstream results through `Arc` rather than
//! copying them. The performance view is derived on demand.

use std::sync::Arc;

use crate::domain::analysis::AnalysisResult;
use crate::domain::error::PipelineError;
use crate::domain::metrics::PerformanceSummary;
use crate::domain::simulation::SimulationResult;

#[derive(Debug, Clone)]
pub struct BacktestResult {
    analysis: Arc<AnalysisResult>,
    simulation: Arc<SimulationResult>,
}

impl BacktestResult {
    pub fn analysis(&self) -> &AnalysisResult {
        &self.analysis
    }

    pub fn simulation(&self) -> &SimulationResult {
        &self.simulation
    }

    pub fn analysis_handle(&self) -> Arc<AnalysisResult> {
        Arc::clone(&self.analysis)
    }

    pub fn simulation_handle(&self) -> Arc<SimulationResult> {
        Arc::clone(&self.simulation)
    }

    pub fn observations(&self) -> usize {
        self.analysis.observations
    }

    pub fn performance(&self) -> PerformanceSummary {
        PerformanceSummary::compute(&self.simulation)
    }
}

pub fn aggregate(
    analysis: Arc<AnalysisResult>,
    simulation: Arc<SimulationResult>,
) -> Result<BacktestResult, PipelineError> {
    let expected = analysis.observations;
    let sequences = [
        ("signal", simulation.signal.len()),
        ("position", simulation.position.len()),
        ("step returns", simulation.step_returns.len()),
        ("realized returns", simulation.realized_returns.len()),
        ("cumulative returns", simulation.cumulative_returns.len()),
    ];

    for (what, actual) in sequences {
        if actual != expected {
            return Err(PipelineError::ShapeMismatch {
                what: what.to_string(),
                expected,
                actual,
            });
        }
    }

    Ok(BacktestResult {
        analysis,
        simulation,
    })
}
