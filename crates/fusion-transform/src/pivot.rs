//! Long-to-wide reshape of the PCR export.
//!
//! The PCR export carries one row per (specimen, channel). The pivot turns
//! it into one row per specimen key with a `<CHANNEL>-<field>` column for
//! every channel and every non-key field.

use std::collections::{BTreeSet, HashMap, HashSet};

use fusion_ingest::SourceTable;
use fusion_model::{AssayProfile, Channel};
use tracing::warn;

use crate::error::{Result, TransformError};
use crate::prepare::specimen_keys;

#[derive(Debug, Clone, Default)]
pub struct PcrPivot {
    /// Specimen keys in first-appearance order.
    pub keys: Vec<String>,
    pub columns: Vec<String>,
    rows: HashMap<String, Vec<String>>,
}

impl PcrPivot {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn row(&self, key: &str) -> Option<&[String]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    /// Value of a pivoted column for a key.
    pub fn value(&self, key: &str, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|name| name == column)?;
        self.row(key)?.get(idx).map(String::as_str)
    }
}

/// Channel labels present in the table: profile channels first, in profile
/// order, then any other labels sorted.
fn channel_order(labels: &BTreeSet<String>, profile: &AssayProfile) -> Vec<String> {
    let mut ordered: Vec<String> = profile
        .channels
        .iter()
        .map(|spec| spec.channel.as_str().to_string())
        .filter(|name| labels.contains(name))
        .collect();
    for label in labels {
        if !ordered.contains(label) {
            ordered.push(label.clone());
        }
    }
    ordered
}

/// Normalizes a channel cell to its canonical spelling when it names a known channel.
fn channel_label(raw: &str) -> String {
    raw.parse::<Channel>()
        .map_or_else(|_| raw.trim().to_string(), |channel| channel.as_str().to_string())
}

/// Pivots the prepared PCR table. A repeated (key, channel) pair is an error.
pub fn pivot_channels(table: &SourceTable, profile: &AssayProfile) -> Result<PcrPivot> {
    let channel_idx = table.column_index(&profile.columns.channel).ok_or_else(|| {
        TransformError::MissingColumns {
            table: "PCR".to_string(),
            columns: vec![profile.columns.channel.clone()],
        }
    })?;
    let key_names = profile.columns.key_columns();
    let fields: Vec<(usize, &str)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(idx, name)| *idx != channel_idx && !key_names.contains(&name.as_str()))
        .map(|(idx, name)| (idx, name.as_str()))
        .collect();

    let keys = specimen_keys(table, &profile.columns);
    let labels: Vec<String> = (0..table.height())
        .map(|row| channel_label(table.cell(row, channel_idx)))
        .collect();

    let present: BTreeSet<String> = labels
        .iter()
        .filter(|label| !label.is_empty())
        .cloned()
        .collect();
    let channels = channel_order(&present, profile);

    let mut columns = Vec::with_capacity(channels.len() * fields.len());
    let mut offsets = HashMap::new();
    for channel in &channels {
        offsets.insert(channel.as_str(), columns.len());
        for (_, field) in &fields {
            columns.push(format!("{channel}-{field}"));
        }
    }

    let mut pivot = PcrPivot {
        keys: Vec::new(),
        columns,
        rows: HashMap::new(),
    };
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for (row, (key, label)) in keys.iter().zip(&labels).enumerate() {
        if label.is_empty() {
            warn!(row, "PCR row without a channel skipped");
            continue;
        }
        let key = key.joined();
        if !seen.insert((key.clone(), label.clone())) {
            return Err(TransformError::DuplicateChannel {
                key,
                channel: label.clone(),
            });
        }
        let Some(&offset) = offsets.get(label.as_str()) else {
            continue;
        };
        if !pivot.rows.contains_key(&key) {
            pivot.keys.push(key.clone());
        }
        let width = pivot.columns.len();
        let values = pivot
            .rows
            .entry(key)
            .or_insert_with(|| vec![String::new(); width]);
        for (pos, (idx, _)) in fields.iter().enumerate() {
            values[offset + pos] = table.cell(row, *idx).to_string();
        }
    }

    Ok(pivot)
}
