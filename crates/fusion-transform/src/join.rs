//! Left join of LIS rows with pivoted PCR rows on the specimen key.

use std::collections::HashSet;

use fusion_ingest::SourceTable;
use fusion_model::SpecimenKey;
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::pivot::PcrPivot;

/// What happens to LIS rows that have no PCR counterpart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum UnmatchedPolicy {
    /// Keep the row with blank PCR-derived columns.
    #[default]
    Keep,
    /// Remove the row from the combined table.
    Divert,
}

/// Keys that failed to match across the two sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub matched: usize,
    pub lis_without_pcr: Vec<String>,
    pub pcr_without_lis: Vec<String>,
    /// Rows removed under [`UnmatchedPolicy::Divert`].
    pub diverted: usize,
}

impl JoinReport {
    pub fn is_complete(&self) -> bool {
        self.lis_without_pcr.is_empty() && self.pcr_without_lis.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct JoinedTable {
    pub table: SourceTable,
    pub keys: Vec<SpecimenKey>,
    pub report: JoinReport,
}

/// Joins every LIS row with its pivoted PCR row. LIS is the authoritative
/// specimen list: unmatched LIS rows are kept or diverted per `policy`,
/// unmatched PCR keys are only reported. A key shared by two LIS rows fails
/// the join.
pub fn join_sources(
    lis: &SourceTable,
    lis_keys: &[SpecimenKey],
    pivot: &PcrPivot,
    policy: UnmatchedPolicy,
) -> Result<JoinedTable> {
    let pcr_columns: Vec<(usize, &String)> = pivot
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| !lis.has_column(name))
        .collect();

    let mut headers = lis.headers.clone();
    headers.extend(pcr_columns.iter().map(|(_, name)| (*name).clone()));

    let mut report = JoinReport::default();
    let mut rows = Vec::with_capacity(lis.height());
    let mut keys = Vec::with_capacity(lis.height());
    let mut lis_key_set = HashSet::new();

    for (row, key) in lis.rows.iter().zip(lis_keys) {
        let joined_key = key.joined();
        if !lis_key_set.insert(joined_key.clone()) {
            return Err(TransformError::DuplicateSpecimen { key: joined_key });
        }
        let mut values = row.clone();
        match pivot.row(&joined_key) {
            Some(pcr_row) => {
                report.matched += 1;
                values.extend(
                    pcr_columns
                        .iter()
                        .map(|(idx, _)| pcr_row.get(*idx).cloned().unwrap_or_default()),
                );
            }
            None => {
                report.lis_without_pcr.push(joined_key);
                if policy == UnmatchedPolicy::Divert {
                    report.diverted += 1;
                    continue;
                }
                values.extend(pcr_columns.iter().map(|_| String::new()));
            }
        }
        rows.push(values);
        keys.push(key.clone());
    }

    report.pcr_without_lis = pivot
        .keys
        .iter()
        .filter(|key| !lis_key_set.contains(key.as_str()))
        .cloned()
        .collect();

    debug!(
        matched = report.matched,
        lis_without_pcr = report.lis_without_pcr.len(),
        pcr_without_lis = report.pcr_without_lis.len(),
        diverted = report.diverted,
        "joined LIS and PCR rows"
    );

    Ok(JoinedTable {
        table: SourceTable::new(headers, rows),
        keys,
        report,
    })
}
