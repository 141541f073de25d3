//! Performance summary derived from a simulated return series.

use super::analysis::sample_std;
use super::simulation::{Signal, SimulationResult};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// Steps by the position held over them, so a lagged run counts the
    /// exposure rather than the signal that produced it.
    pub long_steps: usize,
    pub short_steps: usize,
    pub flat_steps: usize,
    pub undefined_steps: usize,
    pub non_finite_steps: usize,
}

impl PerformanceSummary {
    pub fn compute(simulation: &SimulationResult) -> Self {
        let cumulative = &simulation.cumulative_returns;
        let periods = cumulative.len() as f64;

        let total_return = cumulative.last().map(|c| c - 1.0).unwrap_or(0.0);

        let annualized_return = if periods > 0.0 && total_return.is_finite() {
            (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / periods) - 1.0
        } else {
            f64::NAN
        };

        let finite: Vec<f64> = simulation
            .realized_returns
            .iter()
            .copied()
            .filter(|r| r.is_finite())
            .collect();
        let annualized_volatility =
            sample_std(&finite).unwrap_or(0.0) * TRADING_DAYS_PER_YEAR.sqrt();

        let sharpe_ratio = if annualized_volatility > 0.0 && annualized_volatility.is_finite() {
            annualized_return / annualized_volatility
        } else {
            0.0
        };

        let mut long_steps = 0usize;
        let mut short_steps = 0usize;
        let mut flat_steps = 0usize;
        let mut undefined_steps = 0usize;
        for s in &simulation.position {
            match s {
                Signal::Long => long_steps += 1,
                Signal::Short => short_steps += 1,
                Signal::Flat => flat_steps += 1,
                Signal::Undefined => undefined_steps += 1,
            }
        }

        PerformanceSummary {
            total_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown: compute_drawdown(cumulative),
            long_steps,
            short_steps,
            flat_steps,
            undefined_steps,
            non_finite_steps: simulation.non_finite_steps(),
        }
    }
}

/// Largest peak-to-trough decline, as a fraction of the peak. Non-finite
/// points are skipped.
fn compute_drawdown(curve: &[f64]) -> f64 {
    let mut peak: Option<f64> = None;
    let mut max_dd = 0.0_f64;

    for &value in curve.iter().filter(|v| v.is_finite()) {
        match peak {
            Some(p) if value <= p => {
                if p > 0.0 {
                    max_dd = max_dd.max((p - value) / p);
                }
            }
            _ => peak = Some(value),
        }
    }

    max_dd
}
