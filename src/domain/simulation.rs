//! Moving-average crossover simulation.
//!
//! signal[i] = +1 if Close[i] > MA[i], -1 if below, 0 if equal
//! step[i]   = (Close[i] - Close[i-1]) / Close[i]
//! cum[i]    = prod_{k<=i} (1 + signal[k] * step[k])
//!
//! Series shorter than the window get an all-undefined signal. The first
//! step and the left edge of the moving average follow explicit policies in
//! [`SimulationConfig`].

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::domain::analysis::{mean, sample_std};
use crate::domain::error::PipelineError;
use crate::domain::series::{present_values, Series, CLOSE, VOLUME};

pub const DEFAULT_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Long,
    Short,
    Flat,
    Undefined,
}

impl Signal {
    pub fn value(self) -> Option<i8> {
        match self {
            Signal::Long => Some(1),
            Signal::Short => Some(-1),
            Signal::Flat => Some(0),
            Signal::Undefined => None,
        }
    }

    fn compare(close: f64, ma: f64) -> Self {
        if close > ma {
            Signal::Long
        } else if close < ma {
            Signal::Short
        } else if close == ma {
            Signal::Flat
        } else {
            Signal::Undefined
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Long => "+1",
            Signal::Short => "-1",
            Signal::Flat => "0",
            Signal::Undefined => "NA",
        };
        f.write_str(s)
    }
}

/// How the moving average treats rows before the first full window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaEdgePolicy {
    /// Average whatever history exists so far.
    #[default]
    Expanding,
    /// Leave those rows undefined.
    Undefined,
}

impl FromStr for MaEdgePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expanding" => Ok(MaEdgePolicy::Expanding),
            "undefined" => Ok(MaEdgePolicy::Undefined),
            other => Err(format!("unknown moving-average edge policy '{other}'")),
        }
    }
}

/// How the first step return is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstReturn {
    /// Difference against an assumed zero predecessor: step[0] = 1 for a
    /// non-zero first close. Inflates the first step when a position is held.
    #[default]
    ZeroBaseline,
    /// step[0] = 0.
    Excluded,
}

impl FromStr for FirstReturn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero_baseline" => Ok(FirstReturn::ZeroBaseline),
            "excluded" => Ok(FirstReturn::Excluded),
            other => Err(format!("unknown first-return policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub window: usize,
    pub ma_edge: MaEdgePolicy,
    pub first_return: FirstReturn,
    /// Apply the previous row's signal to the current step.
    pub lag_signal: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            ma_edge: MaEdgePolicy::default(),
            first_return: FirstReturn::default(),
            lag_signal: false,
        }
    }
}

impl SimulationConfig {
    pub fn with_window(window: usize) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub window: usize,
    pub close_mean: Option<f64>,
    pub close_std: Option<f64>,
    pub volume_max: Option<f64>,
    pub moving_average: Vec<Option<f64>>,
    pub signal: Vec<Signal>,
    /// Position actually held at each step (the signal, lagged if configured).
    pub position: Vec<Signal>,
    pub step_returns: Vec<f64>,
    pub realized_returns: Vec<f64>,
    pub cumulative_returns: Vec<f64>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
    }

    pub fn non_finite_steps(&self) -> usize {
        self.cumulative_returns
            .iter()
            .filter(|v| !v.is_finite())
            .count()
    }
}

pub fn simulate(
    series: &Series,
    config: &SimulationConfig,
) -> Result<SimulationResult, PipelineError> {
    if config.window == 0 {
        return Err(PipelineError::ConfigInvalid {
            section: "simulation".into(),
            key: "window".into(),
            reason: "window must be positive".into(),
        });
    }

    let close = required(series, CLOSE)?;
    let volume = required(series, VOLUME)?;
    let n = series.len();

    let close_present = present_values(close);
    let close_mean = mean(&close_present);
    let close_std = sample_std(&close_present);
    let volume_max = present_values(volume).into_iter().reduce(f64::max);

    let (moving_average, signal) = if n < config.window {
        debug!(rows = n, window = config.window, "series shorter than window");
        (vec![None; n], vec![Signal::Undefined; n])
    } else {
        let ma = moving_average(close, config.window, config.ma_edge);
        let sig = close
            .iter()
            .zip(&ma)
            .map(|(c, m)| match (c, m) {
                (Some(c), Some(m)) => Signal::compare(*c, *m),
                _ => Signal::Undefined,
            })
            .collect();
        (ma, sig)
    };

    let position = if config.lag_signal {
        std::iter::once(Signal::Undefined)
            .chain(signal.iter().copied())
            .take(n)
            .collect()
    } else {
        signal.clone()
    };

    let step_returns = step_returns(close, config.first_return);

    let realized_returns: Vec<f64> = position
        .iter()
        .zip(&step_returns)
        .map(|(p, r)| match p.value() {
            Some(v) => f64::from(v) * r,
            None => 0.0,
        })
        .collect();

    let cumulative_returns = realized_returns
        .iter()
        .scan(1.0_f64, |acc, r| {
            *acc *= 1.0 + r;
            Some(*acc)
        })
        .collect();

    Ok(SimulationResult {
        window: config.window,
        close_mean,
        close_std,
        volume_max,
        moving_average,
        signal,
        position,
        step_returns,
        realized_returns,
        cumulative_returns,
    })
}

fn required<'a>(series: &'a Series, field: &str) -> Result<&'a [Option<f64>], PipelineError> {
    series.numeric(field).ok_or_else(|| PipelineError::MissingField {
        field: field.to_string(),
    })
}

/// Trailing simple moving average. Missing values inside a window are skipped.
pub fn moving_average(
    values: &[Option<f64>],
    window: usize,
    edge: MaEdgePolicy,
) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if edge == MaEdgePolicy::Undefined && i + 1 < window {
                return None;
            }
            let start = (i + 1).saturating_sub(window);
            running_mean(&values[start..=i])
        })
        .collect()
}

// Incremental form keeps the mean of identical values exactly equal to them.
fn running_mean(values: &[Option<f64>]) -> Option<f64> {
    let mut m = 0.0;
    let mut k = 0usize;
    for v in values.iter().flatten().filter(|v| !v.is_nan()) {
        k += 1;
        m += (v - m) / k as f64;
    }
    (k > 0).then_some(m)
}

fn step_returns(close: &[Option<f64>], first: FirstReturn) -> Vec<f64> {
    (0..close.len())
        .map(|i| {
            let prev = if i == 0 {
                match first {
                    FirstReturn::ZeroBaseline => Some(0.0),
                    FirstReturn::Excluded => return 0.0,
                }
            } else {
                close[i - 1]
            };
            match (close[i], prev) {
                (Some(c), Some(p)) => (c - p) / c,
                _ => f64::NAN,
            }
        })
        .collect()
}
