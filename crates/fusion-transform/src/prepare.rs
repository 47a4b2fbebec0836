//! Per-source preparation: renaming, trimming, selection and keying.

use fusion_ingest::SourceTable;
use fusion_model::{AssayProfile, CanonicalColumns, SourceLayout, SpecimenKey, TrimRule};
use tracing::debug;

/// Renames instrument-native headers to canonical names.
pub fn rename_columns(table: &mut SourceTable, layout: &SourceLayout) {
    for header in &mut table.headers {
        if let Some(canonical) = layout.renames.get(header.as_str()) {
            *header = canonical.clone();
        }
    }
}

/// Applies each trim rule to its column; absent columns are skipped.
pub fn apply_trims(table: &mut SourceTable, rules: &[TrimRule]) {
    for rule in rules {
        let Some(idx) = table.column_index(&rule.column) else {
            continue;
        };
        for row in &mut table.rows {
            if let Some(cell) = row.get_mut(idx) {
                *cell = rule.apply(cell);
            }
        }
    }
}

/// Keeps only `columns`, in the given order. Absent columns become blank.
pub fn select_columns(table: &SourceTable, columns: &[String]) -> SourceTable {
    let indices: Vec<Option<usize>> = columns
        .iter()
        .map(|name| table.column_index(name))
        .collect();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            indices
                .iter()
                .map(|idx| {
                    idx.and_then(|idx| row.get(idx))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();
    SourceTable::new(columns.to_vec(), rows)
}

/// Removes the instrument's end-of-file row(s). Returns how many were dropped.
pub fn drop_end_rows(table: &mut SourceTable, profile: &AssayProfile) -> usize {
    let Some(idx) = table.column_index(&profile.columns.barcode) else {
        return 0;
    };
    let before = table.height();
    table.retain_rows(|row| {
        !row
            .get(idx)
            .is_some_and(|barcode| profile.is_end_marker(barcode))
    });
    let dropped = before - table.height();
    if dropped > 0 {
        debug!(dropped, "removed end-of-file rows");
    }
    dropped
}

/// Specimen key of every row.
pub fn specimen_keys(table: &SourceTable, columns: &CanonicalColumns) -> Vec<SpecimenKey> {
    let [barcode, run_id, test_order] = columns.key_columns().map(|name| table.column_index(name));
    let value = |row: usize, idx: Option<usize>| idx.map_or("", |idx| table.cell(row, idx));
    (0..table.height())
        .map(|row| {
            SpecimenKey::new(
                value(row, barcode),
                value(row, run_id),
                value(row, test_order),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn table(headers: &[&str], rows: &[&[&str]]) -> SourceTable {
        SourceTable::new(
            headers.iter().map(|h| (*h).to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| (*v).to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn renames_mapped_headers_only() {
        let mut source = table(&["RFU Range", "Channel"], &[]);
        let layout = SourceLayout {
            delimiter: ',',
            renames: BTreeMap::from([(
                "RFU Range".to_string(),
                "Unrounded RFU Range".to_string(),
            )]),
            keep_columns: Vec::new(),
        };
        rename_columns(&mut source, &layout);
        assert_eq!(source.headers, vec!["Unrounded RFU Range", "Channel"]);
    }

    #[test]
    fn trims_configured_columns() {
        let mut source = table(&["OilRFID", "WellID"], &[&["ABCD1234567890123456789", "A1"]]);
        apply_trims(
            &mut source,
            &[TrimRule {
                column: "OilRFID".to_string(),
                front: 4,
                back: 11,
            }],
        );
        assert_eq!(source.rows[0], vec!["12345678", "A1"]);
    }

    #[test]
    fn selects_in_requested_order() {
        let source = table(&["A", "B", "C"], &[&["1", "2", "3"]]);
        let selected = select_columns(&source, &["C".to_string(), "A".to_string()]);
        assert_eq!(selected.headers, vec!["C", "A"]);
        assert_eq!(selected.rows[0], vec!["3", "1"]);
    }

    #[test]
    fn keys_follow_canonical_columns() {
        let source = table(
            &["Specimen Barcode", "Run ID", "Test order #"],
            &[&["S1", "R1", "000001"]],
        );
        let keys = specimen_keys(&source, &CanonicalColumns::default());
        assert_eq!(keys[0].joined(), "S1_R1_000001");
    }
}
