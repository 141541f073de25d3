//! Plain-text report adapter implementing ReportPort.
//!
//! Sections, in order: performance summary, simulation scalars and per-step
//! table, column summary, correlation matrix, regression.

use crate::domain::analysis::{
    AnalysisResult, CategoricalSummary, CorrelationMatrix, NumericSummary, RegressionOutcome,
    SummaryStats,
};
use crate::domain::backtest::BacktestResult;
use crate::domain::metrics::PerformanceSummary;
use crate::domain::regression::{Coefficient, RegressionSummary};
use crate::domain::simulation::SimulationResult;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Clone, Default)]
pub struct TextReportAdapter {
    /// Include the per-step signal/return table.
    pub include_steps: bool,
}

impl TextReportAdapter {
    pub fn new(include_steps: bool) -> Self {
        Self { include_steps }
    }
}

impl ReportPort for TextReportAdapter {
    fn render(&self, result: &BacktestResult, title: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!("=== Backtest Report: {} ===\n", title));
        output.push_str(&format!("Observations: {}\n\n", result.observations()));

        output.push_str(&render_performance(&result.performance()));
        output.push('\n');
        output.push_str(&render_simulation(result.simulation(), self.include_steps));
        output.push('\n');
        output.push_str(&render_analysis(result.analysis()));
        output
    }
}

pub fn render_performance(perf: &PerformanceSummary) -> String {
    let mut output = String::new();
    output.push_str("--- Performance ---\n");
    output.push_str(&format!("Total Return:          {}\n", num(perf.total_return)));
    output.push_str(&format!("Annualized Return:     {}\n", num(perf.annualized_return)));
    output.push_str(&format!(
        "Annualized Volatility: {}\n",
        num(perf.annualized_volatility)
    ));
    output.push_str(&format!("Sharpe Ratio:          {}\n", num(perf.sharpe_ratio)));
    output.push_str(&format!("Max Drawdown:          {}\n", num(perf.max_drawdown)));
    output.push_str(&format!(
        "Signals:               long {}, short {}, flat {}, undefined {}\n",
        perf.long_steps, perf.short_steps, perf.flat_steps, perf.undefined_steps
    ));
    if perf.non_finite_steps > 0 {
        output.push_str(&format!(
            "Non-finite steps:      {}\n",
            perf.non_finite_steps
        ));
    }
    output
}

pub fn render_simulation(sim: &SimulationResult, include_steps: bool) -> String {
    let mut output = String::new();
    output.push_str(&format!("--- Simulation (window {}) ---\n", sim.window));
    output.push_str(&format!("Close mean:  {}\n", opt(sim.close_mean)));
    output.push_str(&format!("Close std:   {}\n", opt(sim.close_std)));
    output.push_str(&format!("Volume max:  {}\n", opt(sim.volume_max)));

    if include_steps {
        output.push_str(&format!(
            "{:>5} {:>12} {:>6} {:>12} {:>12}\n",
            "idx", "ma", "signal", "step", "cumulative"
        ));
        for i in 0..sim.len() {
            output.push_str(&format!(
                "{:>5} {:>12} {:>6} {:>12} {:>12}\n",
                i,
                opt(sim.moving_average[i]),
                sim.signal[i].to_string(),
                num(sim.step_returns[i]),
                num(sim.cumulative_returns[i])
            ));
        }
    }
    output
}

pub fn render_analysis(analysis: &AnalysisResult) -> String {
    let mut output = String::new();
    output.push_str("--- Column Summary ---\n");
    for column in &analysis.summary {
        match &column.stats {
            SummaryStats::Numeric(s) => output.push_str(&render_numeric(&column.name, s)),
            SummaryStats::Categorical(s) => output.push_str(&render_categorical(&column.name, s)),
        }
    }
    output.push('\n');
    output.push_str(&render_correlation(&analysis.correlation));
    output.push('\n');
    output.push_str(&render_regression(&analysis.regression));
    output
}

fn render_numeric(name: &str, s: &NumericSummary) -> String {
    format!(
        "{}: count {}, mean {}, std {}, min {}, 25% {}, 50% {}, 75% {}, max {}\n",
        name,
        s.count,
        opt(s.mean),
        opt(s.std),
        opt(s.min),
        opt(s.q25),
        opt(s.median),
        opt(s.q75),
        opt(s.max)
    )
}

fn render_categorical(name: &str, s: &CategoricalSummary) -> String {
    format!(
        "{}: count {}, unique {}, top {}, freq {}\n",
        name,
        s.count,
        s.unique,
        s.top.as_deref().unwrap_or("NA"),
        s.freq
    )
}

pub fn render_correlation(matrix: &CorrelationMatrix) -> String {
    let mut output = String::new();
    output.push_str("--- Correlation ---\n");
    if matrix.is_empty() {
        output.push_str("(no numeric columns)\n");
        return output;
    }

    let width = matrix
        .names
        .iter()
        .map(|n| n.len())
        .max()
        .unwrap_or(0)
        .max(8);

    output.push_str(&format!("{:width$}", "", width = width));
    for name in &matrix.names {
        output.push_str(&format!(" {:>width$}", name, width = width));
    }
    output.push('\n');

    for (name, row) in matrix.names.iter().zip(&matrix.values) {
        output.push_str(&format!("{:width$}", name, width = width));
        for value in row {
            output.push_str(&format!(" {:>width$}", num(*value), width = width));
        }
        output.push('\n');
    }
    output
}

pub fn render_regression(outcome: &RegressionOutcome) -> String {
    let mut output = String::new();
    output.push_str("--- Regression ---\n");
    match outcome {
        RegressionOutcome::Fitted(fit) => output.push_str(&render_fit(fit)),
        RegressionOutcome::Failed(reason) | RegressionOutcome::MissingColumns(reason) => {
            output.push_str(reason);
            output.push('\n');
        }
    }
    output
}

fn render_fit(fit: &RegressionSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{} ~ {} ({} observations)\n",
        fit.response, fit.predictor, fit.observations
    ));
    output.push_str(&format!(
        "{:<12} {:>14} {:>14} {:>10} {:>10}\n",
        "", "Estimate", "Std. Error", "t value", "Pr(>|t|)"
    ));
    output.push_str(&render_coefficient("(Intercept)", &fit.intercept));
    output.push_str(&render_coefficient(&fit.predictor, &fit.slope));
    output.push_str(&format!(
        "Residual standard error: {} on {} degrees of freedom\n",
        num(fit.residual_std_error),
        fit.df_residual
    ));
    output.push_str(&format!(
        "R-squared: {}, Adjusted R-squared: {}\n",
        num(fit.r_squared),
        num(fit.adj_r_squared)
    ));
    output.push_str(&format!(
        "F-statistic: {} on 1 and {} DF\n",
        num(fit.f_statistic),
        fit.df_residual
    ));
    output
}

fn render_coefficient(label: &str, c: &Coefficient) -> String {
    format!(
        "{:<12} {:>14} {:>14} {:>10} {:>10}\n",
        label,
        num(c.estimate),
        num(c.std_error),
        num(c.t_value),
        num(c.p_value)
    )
}

fn num(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{:.4}", value)
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(num).unwrap_or_else(|| "NA".to_string())
}
