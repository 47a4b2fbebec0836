//! Shared utilities for the fusion crates.
//!
//! This crate provides the Polars `AnyValue` helpers and text-frame builders
//! used by every stage of the reconciliation pipeline. All combined tables are
//! carried as string columns so instrument identifiers never lose leading
//! zeros; numeric interpretation happens at the point of use.

pub mod polars;

pub use polars::{
    any_to_string, column_strings, column_value_string, format_numeric, parse_f64,
    stack_string_frames, string_frame, with_string_columns,
};
