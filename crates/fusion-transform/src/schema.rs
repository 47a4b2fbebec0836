//! Schema validation ahead of column selection.

use std::collections::BTreeSet;

use fusion_model::AssayProfile;

use crate::error::{Result, TransformError};

/// Columns from `required` that are absent from `headers`, in `required` order.
pub fn missing_columns(headers: &[String], required: &[String]) -> Vec<String> {
    let present: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
    let mut seen = BTreeSet::new();
    required
        .iter()
        .filter(|name| !present.contains(name.as_str()))
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Fails with every missing column named.
pub fn validate_columns(table: &str, headers: &[String], required: &[String]) -> Result<()> {
    let columns = missing_columns(headers, required);
    if columns.is_empty() {
        Ok(())
    } else {
        Err(TransformError::MissingColumns {
            table: table.to_string(),
            columns,
        })
    }
}

fn push_unique(columns: &mut Vec<String>, name: &str) {
    if !columns.iter().any(|existing| existing == name) {
        columns.push(name.to_string());
    }
}

/// Columns the PCR export must carry after renaming.
pub fn required_pcr_columns(profile: &AssayProfile) -> Vec<String> {
    let mut columns = Vec::new();
    for name in profile.columns.key_columns() {
        push_unique(&mut columns, name);
    }
    push_unique(&mut columns, &profile.columns.channel);
    for name in &profile.pcr.keep_columns {
        push_unique(&mut columns, name);
    }
    for rule in &profile.trims {
        push_unique(&mut columns, &rule.column);
    }
    for field in &profile.consolidated_fields {
        push_unique(&mut columns, field);
    }
    columns
}

/// Columns the LIS export must carry after renaming.
pub fn required_lis_columns(profile: &AssayProfile) -> Vec<String> {
    let mut columns = Vec::new();
    for name in profile.columns.key_columns() {
        push_unique(&mut columns, name);
    }
    for name in &profile.lis.keep_columns {
        push_unique(&mut columns, name);
    }
    push_unique(&mut columns, &profile.columns.sample_type);
    for spec in &profile.channels {
        push_unique(&mut columns, &spec.interpretation_column);
        push_unique(&mut columns, &spec.rfu_column);
        push_unique(&mut columns, &spec.ct_column);
    }
    columns
}

/// Columns the rule engine and statistics read from the combined table.
pub fn engine_columns(profile: &AssayProfile) -> Vec<String> {
    let mut columns = Vec::new();
    for name in profile.columns.key_columns() {
        push_unique(&mut columns, name);
    }
    push_unique(&mut columns, &profile.columns.sample_type);
    for spec in &profile.channels {
        push_unique(&mut columns, &spec.interpretation_column);
        push_unique(&mut columns, &spec.rfu_column);
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn reports_missing_in_required_order() {
        let headers = names(&["A", "C"]);
        let required = names(&["D", "A", "B", "D"]);
        assert_eq!(missing_columns(&headers, &required), names(&["D", "B"]));
    }

    #[test]
    fn validate_passes_when_complete() {
        let headers = names(&["A", "B"]);
        assert!(validate_columns("LIS", &headers, &names(&["B"])).is_ok());
        let err = validate_columns("LIS", &headers, &names(&["Z"])).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingColumns { ref table, ref columns }
                if table == "LIS" && columns == &names(&["Z"])
        ));
    }
}
