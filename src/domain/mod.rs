//! Core domain types and pipeline stages.

pub mod series;
pub mod validation;
pub mod analysis;
pub mod regression;
pub mod simulation;
pub mod metrics;
pub mod backtest;
pub mod preprocess;
pub mod pipeline;
pub mod config_validation;
pub mod error;
