//! Data access port trait.
//!
//! Loaders hand the core a [`Series`]; shape checks happen later in the
//! validator, not here.

use crate::domain::error::PipelineError;
use crate::domain::series::Series;

pub trait DataPort {
    fn fetch_series(&self, name: &str) -> Result<Series, PipelineError>;

    fn list_series(&self) -> Result<Vec<String>, PipelineError>;
}
