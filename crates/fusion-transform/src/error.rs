use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// Expected columns absent after renaming; the export format does not
    /// match the assay profile.
    #[error("{table} table is missing columns: {}", .columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("specimen {key} has more than one {channel} row")]
    DuplicateChannel { key: String, channel: String },

    #[error("specimen {key} appears in more than one LIS row")]
    DuplicateSpecimen { key: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
