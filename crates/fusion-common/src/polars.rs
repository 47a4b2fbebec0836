//! Polars AnyValue utility functions.
//!
//! This module provides helper functions for working with Polars `AnyValue` types,
//! including string conversions, numeric parsing, and building all-text frames.

use polars::prelude::{AnyValue, Column, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null`, properly formats numeric types without
/// unnecessary trailing zeros.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use fusion_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
/// assert_eq!(any_to_string(AnyValue::String("0000574")), "0000574");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "true" } else { "false" }.to_string(),
        other => other.to_string(),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use fusion_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.5), "1.5");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Parses a string as a finite `f64`.
///
/// Returns `None` for empty, non-numeric, `NaN` and infinite inputs, so
/// textual no-call markers never leak into numeric aggregation.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Get a string value from a DataFrame column at the given row index.
///
/// Missing columns and out-of-range rows read as an empty string.
pub fn column_value_string(df: &DataFrame, name: &str, idx: usize) -> String {
    match df.column(name) {
        Ok(column) => any_to_string(column.get(idx).unwrap_or(AnyValue::Null)),
        Err(_) => String::new(),
    }
}

/// Extract every value of a column as strings, or `None` if the column is absent.
pub fn column_strings(df: &DataFrame, name: &str) -> Option<Vec<String>> {
    let column = df.column(name).ok()?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_string(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Some(values)
}

/// Build a DataFrame of string columns, preserving the given column order.
pub fn string_frame(columns: Vec<(String, Vec<String>)>) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = columns
        .into_iter()
        .map(|(name, values)| Series::new(name.as_str().into(), values).into_column())
        .collect();
    DataFrame::new(columns)
}

/// Returns `df` with the given text columns replaced in place or appended.
pub fn with_string_columns(
    df: &DataFrame,
    columns: Vec<(String, Vec<String>)>,
) -> PolarsResult<DataFrame> {
    let mut replacements: Vec<Option<(String, Vec<String>)>> =
        columns.into_iter().map(Some).collect();
    let mut output = Vec::with_capacity(df.width() + replacements.len());
    for name in df.get_column_names() {
        let replacement = replacements
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|(new, _)| new.as_str() == name.as_str()))
            .and_then(Option::take);
        match replacement {
            Some(column) => output.push(column),
            None => output.push((
                name.to_string(),
                column_strings(df, name.as_str()).unwrap_or_default(),
            )),
        }
    }
    output.extend(replacements.into_iter().flatten());
    string_frame(output)
}

/// Stacks frames vertically as text columns.
///
/// The output carries the union of column names in first-seen order; a
/// frame lacking a column contributes blanks for it.
pub fn stack_string_frames(frames: &[&DataFrame]) -> PolarsResult<DataFrame> {
    let mut names: Vec<String> = Vec::new();
    for frame in frames {
        for name in frame.get_column_names() {
            if !names.iter().any(|existing| existing.as_str() == name.as_str()) {
                names.push(name.to_string());
            }
        }
    }
    let columns = names
        .into_iter()
        .map(|name| {
            let mut values = Vec::new();
            for frame in frames {
                match column_strings(frame, &name) {
                    Some(column) => values.extend(column),
                    None => values.extend(std::iter::repeat_n(String::new(), frame.height())),
                }
            }
            (name, values)
        })
        .collect();
    string_frame(columns)
}
