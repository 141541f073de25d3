//! Simple linear regression (ordinary least squares, one predictor plus intercept).
//!
//! The fit reports the usual inferential diagnostics: standard errors,
//! t statistics and two-sided p-values for both coefficients, R² and
//! adjusted R², residual standard error and the F statistic.

use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

/// Reasons a fit cannot be produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegressionError {
    #[error("insufficient observations: need at least {needed}, have {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("predictor '{0}' has zero variance (singular design)")]
    SingularDesign(String),

    #[error("column '{0}' is not numeric")]
    NonNumeric(String),

    #[error("non-finite coefficient estimate")]
    NonFinite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionSummary {
    pub response: String,
    pub predictor: String,
    pub intercept: Coefficient,
    pub slope: Coefficient,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub residual_std_error: f64,
    pub df_residual: usize,
    pub f_statistic: f64,
    /// Complete rows used in the fit.
    pub observations: usize,
}

/// Minimum rows for a fit with at least one residual degree of freedom.
pub const MIN_OBSERVATIONS: usize = 3;

/// Fit `y = b0 + b1 * x` over paired observations.
pub fn fit_ols(
    response: &str,
    predictor: &str,
    x: &[f64],
    y: &[f64],
) -> Result<RegressionSummary, RegressionError> {
    let n = x.len().min(y.len());
    if n < MIN_OBSERVATIONS {
        return Err(RegressionError::InsufficientData {
            needed: MIN_OBSERVATIONS,
            got: n,
        });
    }
    let (x, y) = (&x[..n], &y[..n]);
    let nf = n as f64;

    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let sxx: f64 = x.iter().map(|&xi| (xi - mean_x).powi(2)).sum();
    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let syy: f64 = y.iter().map(|&yi| (yi - mean_y).powi(2)).sum();

    if sxx <= f64::EPSILON * mean_x.abs().max(1.0) * nf {
        return Err(RegressionError::SingularDesign(predictor.to_string()));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(RegressionError::NonFinite);
    }

    let sse: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (yi - (intercept + slope * xi)).powi(2))
        .sum();

    let df_residual = n - 2;
    let df = df_residual as f64;
    let sigma2 = sse / df;

    let se_slope = (sigma2 / sxx).sqrt();
    let se_intercept = (sigma2 * (1.0 / nf + mean_x * mean_x / sxx)).sqrt();

    let r_squared = if syy > 0.0 { 1.0 - sse / syy } else { f64::NAN };
    let adj_r_squared = 1.0 - (1.0 - r_squared) * (nf - 1.0) / df;
    let f_statistic = if sigma2 > 0.0 {
        (syy - sse) / sigma2
    } else {
        f64::INFINITY
    };

    Ok(RegressionSummary {
        response: response.to_string(),
        predictor: predictor.to_string(),
        intercept: coefficient(intercept, se_intercept, df),
        slope: coefficient(slope, se_slope, df),
        r_squared,
        adj_r_squared,
        residual_std_error: sigma2.sqrt(),
        df_residual,
        f_statistic,
        observations: n,
    })
}

fn coefficient(estimate: f64, std_error: f64, df: f64) -> Coefficient {
    let t_value = estimate / std_error;
    Coefficient {
        estimate,
        std_error,
        t_value,
        p_value: student_t_two_sided_p(t_value, df),
    }
}

/// Two-sided p-value of a Student t statistic.
pub fn student_t_two_sided_p(t: f64, df: f64) -> f64 {
    if t.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).min(1.0),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn textbook_fit() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = fit_ols("y", "x", &x, &y).unwrap();

        assert_relative_eq!(fit.slope.estimate, 0.6, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept.estimate, 2.2, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared, 0.6, epsilon = 1e-12);
        assert_relative_eq!(fit.adj_r_squared, 1.0 - 0.4 * 4.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(fit.residual_std_error, 0.8_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(fit.slope.std_error, 0.08_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(fit.intercept.std_error, 0.88_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(fit.f_statistic, 4.5, epsilon = 1e-9);
        assert_relative_eq!(fit.slope.t_value.powi(2), fit.f_statistic, epsilon = 1e-9);
        assert_eq!(fit.df_residual, 3);
        assert_eq!(fit.observations, 5);
        assert!(fit.slope.p_value > 0.0 && fit.slope.p_value < 1.0);
    }

    #[test]
    fn too_few_rows() {
        let err = fit_ols("y", "x", &[1.0, 2.0], &[3.0, 4.0]).unwrap_err();
        assert_eq!(err, RegressionError::InsufficientData { needed: 3, got: 2 });
    }

    #[test]
    fn constant_predictor_is_singular() {
        let err = fit_ols("y", "x", &[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, RegressionError::SingularDesign("x".into()));
    }

    #[test]
    fn perfect_fit_has_zero_p_value() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 5.0, 7.0, 9.0];
        let fit = fit_ols("y", "x", &x, &y).unwrap();
        assert_relative_eq!(fit.slope.estimate, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
        assert_eq!(fit.slope.p_value, 0.0);
    }

    #[test]
    fn t_p_value_cauchy_case() {
        // df = 1 is the Cauchy distribution: p = 1 - 2/pi * atan(|t|)
        assert_relative_eq!(student_t_two_sided_p(1.0, 1.0), 0.5, epsilon = 1e-9);
        let expected = 1.0 - 2.0 / std::f64::consts::PI * 3.0_f64.atan();
        assert_relative_eq!(student_t_two_sided_p(3.0, 1.0), expected, epsilon = 1e-9);
    }

    #[test]
    fn t_p_value_critical_value() {
        // t(0.975, 10) = 2.228138852
        assert_relative_eq!(student_t_two_sided_p(2.228_138_852, 10.0), 0.05, epsilon = 1e-6);
        assert_relative_eq!(student_t_two_sided_p(0.0, 10.0), 1.0, epsilon = 1e-12);
    }
}
