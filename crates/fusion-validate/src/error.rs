//! Error types for the rule engine.

use fusion_model::ModelError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while qualifying a combined table.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// A label regex in the profile did not compile.
    #[error("invalid label rules: {0}")]
    Labels(#[from] ModelError),

    /// Columns the rules read are absent from the combined table.
    #[error("combined table is missing columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, ValidateError>;
