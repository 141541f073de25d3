//! Statistical analysis stage.
//!
//! Produces per-column descriptive statistics, a pairwise-complete Pearson
//! correlation matrix over the numeric columns and, when both `Close` and
//! `Volume` exist, a regression of `Close` on `Volume`. Regression failures
//! are recorded in [`RegressionOutcome`] and never returned as errors.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::regression::{self, RegressionError, RegressionSummary};
use crate::domain::series::{present_values, ColumnData, Series, CLOSE, VOLUME};

pub const REGRESSION_MISSING_COLUMNS: &str =
    "Close or Volume column not found; regression skipped";

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryStats {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub stats: SummaryStats,
}

/// Symmetric matrix indexed by numeric column names. Undefined cells are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[i][j])
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegressionOutcome {
    Fitted(RegressionSummary),
    /// Both columns present but the fit could not be computed.
    Failed(String),
    /// `Close` or `Volume` absent.
    MissingColumns(String),
}

impl RegressionOutcome {
    pub fn fitted(&self) -> Option<&RegressionSummary> {
        match self {
            RegressionOutcome::Fitted(s) => Some(s),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            RegressionOutcome::Fitted(_) => None,
            RegressionOutcome::Failed(r) | RegressionOutcome::MissingColumns(r) => Some(r),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub observations: usize,
    pub summary: Vec<ColumnSummary>,
    pub correlation: CorrelationMatrix,
    pub regression: RegressionOutcome,
}

impl AnalysisResult {
    pub fn column_summary(&self, name: &str) -> Option<&ColumnSummary> {
        self.summary.iter().find(|s| s.name == name)
    }
}

pub fn analyze(series: &Series) -> AnalysisResult {
    let summary = series
        .columns
        .iter()
        .map(|c| ColumnSummary {
            name: c.name.clone(),
            stats: match &c.data {
                ColumnData::Numeric(v) => SummaryStats::Numeric(describe_numeric(v)),
                ColumnData::Text(v) => SummaryStats::Categorical(describe_text(v)),
            },
        })
        .collect();

    let regression = regress_close_on_volume(series);
    if let Some(reason) = regression.failure_reason() {
        warn!(reason, "regression unavailable");
    }

    AnalysisResult {
        observations: series.len(),
        summary,
        correlation: correlation_matrix(series),
        regression,
    }
}

pub fn describe_numeric(values: &[Option<f64>]) -> NumericSummary {
    let mut present = present_values(values);
    present.sort_by(|a, b| a.total_cmp(b));
    let count = present.len();

    NumericSummary {
        count,
        mean: mean(&present),
        std: sample_std(&present),
        min: present.first().copied(),
        q25: quantile_sorted(&present, 0.25),
        median: quantile_sorted(&present, 0.5),
        q75: quantile_sorted(&present, 0.75),
        max: present.last().copied(),
    }
}

pub fn describe_text(values: &[Option<String>]) -> CategoricalSummary {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for v in values.iter().flatten() {
        let entry = counts.entry(v.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(v.as_str());
        }
        *entry += 1;
    }

    // ties go to the level seen first
    let mut top: Option<&str> = None;
    let mut freq = 0;
    for &level in &order {
        let n = counts[level];
        if n > freq {
            top = Some(level);
            freq = n;
        }
    }

    CategoricalSummary {
        count: values.iter().flatten().count(),
        unique: order.len(),
        top: top.map(str::to_string),
        freq,
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with n - 1 in the denominator.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Linear interpolation between closest ranks on a sorted slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn correlation_matrix(series: &Series) -> CorrelationMatrix {
    let columns: Vec<(&str, &[Option<f64>])> = series.numeric_columns().collect();
    let k = columns.len();
    let mut values = vec![vec![f64::NAN; k]; k];

    for i in 0..k {
        for j in i..k {
            let mut r = pairwise_pearson(columns[i].1, columns[j].1);
            if i == j && !r.is_nan() {
                r = 1.0;
            }
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        names: columns.iter().map(|(n, _)| n.to_string()).collect(),
        values,
    }
}

/// Pearson correlation over the rows where both values are present.
/// NaN with fewer than two such rows or zero variance on either side.
pub fn pairwise_pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let (xs, ys) = complete_pairs(x, y);
    let n = xs.len();
    if n < 2 || is_constant(&xs) || is_constant(&ys) {
        return f64::NAN;
    }

    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in xs.iter().zip(&ys) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

// Centred sums of a constant run are not exactly zero for most values.
fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

fn complete_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
            _ => None,
        })
        .unzip()
}

fn regress_close_on_volume(series: &Series) -> RegressionOutcome {
    let (close, volume) = match (series.column(CLOSE), series.column(VOLUME)) {
        (Some(c), Some(v)) => (c, v),
        _ => return RegressionOutcome::MissingColumns(REGRESSION_MISSING_COLUMNS.to_string()),
    };

    let fit = || -> Result<RegressionSummary, RegressionError> {
        let y = close
            .as_numeric()
            .ok_or_else(|| RegressionError::NonNumeric(CLOSE.to_string()))?;
        let x = volume
            .as_numeric()
            .ok_or_else(|| RegressionError::NonNumeric(VOLUME.to_string()))?;
        let (xs, ys) = complete_pairs(x, y);
        regression::fit_ols(CLOSE, VOLUME, &xs, &ys)
    };

    match fit() {
        Ok(summary) => RegressionOutcome::Fitted(summary),
        Err(e) => RegressionOutcome::Failed(format!("Regression failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::Column;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    fn series(columns: Vec<Column>) -> Series {
        let n = columns.first().map(Column::len).unwrap_or(0);
        Series::new(dates(n), columns)
    }

    #[test]
    fn describe_numeric_quartiles() {
        let s = describe_numeric(&[Some(4.0), Some(1.0), None, Some(3.0), Some(2.0)]);
        assert_eq!(s.count, 4);
        assert_relative_eq!(s.mean.unwrap(), 2.5);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(4.0));
        assert_relative_eq!(s.q25.unwrap(), 1.75);
        assert_relative_eq!(s.median.unwrap(), 2.5);
        assert_relative_eq!(s.q75.unwrap(), 3.25);
        assert_relative_eq!(s.std.unwrap(), (5.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn describe_numeric_all_missing() {
        let s = describe_numeric(&[None, None]);
        assert_eq!(s.count, 0);
        assert_eq!(s.mean, None);
        assert_eq!(s.std, None);
        assert_eq!(s.median, None);
    }

    #[test]
    fn describe_numeric_single_value_has_no_std() {
        let s = describe_numeric(&[Some(7.0)]);
        assert_eq!(s.count, 1);
        assert_eq!(s.std, None);
        assert_eq!(s.q25, Some(7.0));
    }

    #[test]
    fn describe_text_top_and_ties() {
        let values = vec![
            Some("b".to_string()),
            Some("a".to_string()),
            None,
            Some("a".to_string()),
            Some("b".to_string()),
            Some("c".to_string()),
        ];
        let s = describe_text(&values);
        assert_eq!(s.count, 5);
        assert_eq!(s.unique, 3);
        assert_eq!(s.top.as_deref(), Some("b"));
        assert_eq!(s.freq, 2);
    }

    #[test]
    fn text_columns_are_summarized_not_correlated() {
        let result = analyze(&series(vec![
            Column::text("Ticker", vec![Some("X".into()), Some("X".into()), Some("Y".into())]),
            Column::numeric("Open", &[1.0, 2.0, 3.0]),
            Column::numeric("High", &[2.0, 4.0, 7.0]),
        ]));
        assert!(matches!(
            result.column_summary("Ticker").unwrap().stats,
            SummaryStats::Categorical(_)
        ));
        assert_eq!(result.correlation.names, vec!["Open", "High"]);
        assert!(result.correlation.get("Ticker", "Open").is_none());
    }

    #[test]
    fn correlation_single_numeric_column() {
        let m = correlation_matrix(&series(vec![Column::numeric("Open", &[1.0, 2.0])]));
        assert_eq!(m.len(), 1);
        assert_relative_eq!(m.get("Open", "Open").unwrap(), 1.0);
    }

    #[test]
    fn correlation_no_numeric_columns() {
        let m = correlation_matrix(&series(vec![Column::text("T", vec![Some("a".into())])]));
        assert!(m.is_empty());
    }

    #[test]
    fn correlation_pairwise_complete_rows() {
        // a/b share rows 0..3, a/c share rows 1..4: each cell uses its own subset
        let a = Column::numeric_opt("a", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let b = Column::numeric_opt("b", vec![Some(2.0), Some(4.0), Some(6.0), None]);
        let c = Column::numeric_opt("c", vec![None, Some(9.0), Some(8.0), Some(7.0)]);
        let m = correlation_matrix(&series(vec![a, b, c]));

        assert_relative_eq!(m.get("a", "b").unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(m.get("a", "c").unwrap(), -1.0, epsilon = 1e-12);
        assert_relative_eq!(m.get("b", "c").unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn correlation_zero_variance_is_nan() {
        let m = correlation_matrix(&series(vec![
            Column::numeric("flat", &[5.0, 5.0, 5.0]),
            Column::numeric("up", &[1.0, 2.0, 3.0]),
        ]));
        assert!(m.get("flat", "up").unwrap().is_nan());
        assert!(m.get("flat", "flat").unwrap().is_nan());
        assert_relative_eq!(m.get("up", "up").unwrap(), 1.0);
    }

    #[test]
    fn correlation_constant_inexact_value_is_nan() {
        for v in [0.1, 0.7, 1.1, 1e-8] {
            let m = correlation_matrix(&series(vec![
                Column::numeric("flat", &[v, v, v]),
                Column::numeric("up", &[1.0, 2.0, 3.0]),
            ]));
            assert!(m.get("flat", "flat").unwrap().is_nan(), "v = {v}");
            assert!(m.get("flat", "up").unwrap().is_nan(), "v = {v}");
        }
    }

    #[test]
    fn correlation_constant_over_complete_rows_only() {
        // b varies overall but is constant on the rows it shares with a
        let a = Column::numeric_opt("a", vec![Some(1.0), Some(2.0), Some(3.0), None]);
        let b = Column::numeric_opt("b", vec![Some(0.3), Some(0.3), Some(0.3), Some(9.0)]);
        let m = correlation_matrix(&series(vec![a, b]));
        assert!(m.get("a", "b").unwrap().is_nan());
        assert_relative_eq!(m.get("b", "b").unwrap(), 1.0);
    }

    #[test]
    fn correlation_too_few_complete_rows_is_nan() {
        let r = pairwise_pearson(&[Some(1.0), None, Some(3.0)], &[None, Some(2.0), Some(1.0)]);
        assert!(r.is_nan());
    }

    #[test]
    fn regression_missing_volume() {
        let result = analyze(&series(vec![Column::numeric(CLOSE, &[1.0, 2.0, 3.0])]));
        assert_eq!(
            result.regression,
            RegressionOutcome::MissingColumns(REGRESSION_MISSING_COLUMNS.to_string())
        );
        assert_eq!(result.regression.failure_reason(), Some(REGRESSION_MISSING_COLUMNS));
    }

    #[test]
    fn regression_single_row_fails_but_summary_survives() {
        let result = analyze(&series(vec![
            Column::numeric(CLOSE, &[100.0]),
            Column::numeric(VOLUME, &[1000.0]),
        ]));
        let reason = result.regression.failure_reason().unwrap();
        assert!(reason.starts_with("Regression failed:"));
        assert_ne!(reason, REGRESSION_MISSING_COLUMNS);
        assert!(matches!(result.regression, RegressionOutcome::Failed(_)));
        assert_eq!(result.summary.len(), 2);
        assert_eq!(result.correlation.len(), 2);
    }

    #[test]
    fn regression_non_numeric_close_fails() {
        let result = analyze(&series(vec![
            Column::text(CLOSE, vec![Some("n/a".into()); 3]),
            Column::numeric(VOLUME, &[1.0, 2.0, 3.0]),
        ]));
        assert_eq!(
            result.regression.failure_reason(),
            Some("Regression failed: column 'Close' is not numeric")
        );
    }

    #[test]
    fn regression_constant_volume_fails() {
        let result = analyze(&series(vec![
            Column::numeric(CLOSE, &[1.0, 2.0, 3.0]),
            Column::numeric(VOLUME, &[10.0, 10.0, 10.0]),
        ]));
        assert!(matches!(result.regression, RegressionOutcome::Failed(_)));
    }

    #[test]
    fn regression_fits_close_on_volume() {
        let result = analyze(&series(vec![
            Column::numeric(CLOSE, &[12.0, 14.0, 16.0, 18.0]),
            Column::numeric(VOLUME, &[1.0, 2.0, 3.0, 4.0]),
        ]));
        let fit = result.regression.fitted().unwrap();
        assert_eq!(fit.response, CLOSE);
        assert_eq!(fit.predictor, VOLUME);
        assert_relative_eq!(fit.slope.estimate, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept.estimate, 10.0, epsilon = 1e-12);
        assert!(result.regression.failure_reason().is_none());
    }
}
