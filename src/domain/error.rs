//! Domain error types.

use std::fmt;

/// Pipeline stage, used to report where a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Analyze,
    Simulate,
    Aggregate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::Analyze => "analyze",
            Stage::Simulate => "simulate",
            Stage::Aggregate => "aggregate",
        };
        f.write_str(name)
    }
}

/// Top-level error type for quantpipe.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("shape mismatch in {what}: expected {expected} rows, got {actual}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("deadline exceeded before {stage} stage")]
    DeadlineExceeded { stage: Stage },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// The pipeline stage this error aborts, if it originates inside the pipeline.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::InvalidInput { .. } => Some(Stage::Validate),
            PipelineError::MissingField { .. } => Some(Stage::Simulate),
            PipelineError::ShapeMismatch { .. } => Some(Stage::Aggregate),
            PipelineError::DeadlineExceeded { stage } => Some(*stage),
            _ => None,
        }
    }
}

impl From<&PipelineError> for std::process::ExitCode {
    fn from(err: &PipelineError) -> Self {
        let code: u8 = match err {
            PipelineError::Io(_) => 1,
            PipelineError::ConfigParse { .. }
            | PipelineError::ConfigMissing { .. }
            | PipelineError::ConfigInvalid { .. } => 2,
            PipelineError::Data { .. } => 3,
            PipelineError::InvalidInput { .. } => 4,
            PipelineError::MissingField { .. } => 5,
            PipelineError::ShapeMismatch { .. } => 6,
            PipelineError::DeadlineExceeded { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}
