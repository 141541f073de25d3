//! Series shape validation.
//!
//! Runs before any pipeline stage. Only the tabular shape is checked here;
//! a missing `Close` or `Volume` column is left for the analyzer and the
//! simulator to handle.

use std::collections::HashSet;

use crate::domain::error::PipelineError;
use crate::domain::series::Series;

pub fn validate(series: Series) -> Result<Series, PipelineError> {
    validate_columns(&series)?;
    validate_rows(&series)?;
    validate_order(&series)?;
    Ok(series)
}

fn validate_columns(series: &Series) -> Result<(), PipelineError> {
    if series.columns.is_empty() {
        return Err(invalid("series has no columns"));
    }

    let mut seen = HashSet::new();
    for column in &series.columns {
        if column.name.trim().is_empty() {
            return Err(invalid("column with empty name"));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(invalid(format!("duplicate column '{}'", column.name)));
        }
        if column.len() != series.len() {
            return Err(invalid(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                series.len()
            )));
        }
    }
    Ok(())
}

fn validate_rows(series: &Series) -> Result<(), PipelineError> {
    if series.is_empty() {
        return Err(invalid("series has no observations"));
    }
    Ok(())
}

fn validate_order(series: &Series) -> Result<(), PipelineError> {
    if let Some(i) = series.timestamps.windows(2).position(|w| w[1] < w[0]) {
        return Err(invalid(format!(
            "timestamps not ascending at row {}: {} follows {}",
            i + 1,
            series.timestamps[i + 1],
            series.timestamps[i]
        )));
    }
    Ok(())
}

fn invalid(reason: impl Into<String>) -> PipelineError {
    PipelineError::InvalidInput {
        reason: reason.into(),
    }
}
