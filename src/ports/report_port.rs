//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::PipelineError;

/// Port for rendering a finished run. Reporters only read the result.
pub trait ReportPort {
    fn render(&self, result: &BacktestResult, title: &str) -> String;

    /// Default implementation: render and write to `output_path`.
    fn write(
        &self,
        result: &BacktestResult,
        title: &str,
        output_path: &Path,
    ) -> Result<(), PipelineError> {
        std::fs::write(output_path, self.render(result, title))?;
        Ok(())
    }
}
