//! Signal blanking and consolidation of channel-duplicated fields.

use fusion_ingest::SourceTable;
use fusion_model::{AssayProfile, ChannelRole};

/// Sentinel written over the RFU of a channel without a usable signal.
pub const NO_SIGNAL: &str = "-";

/// Overwrites the rounded RFU with [`NO_SIGNAL`] for target channels called
/// negative and for an internal control called invalid. Returns the number
/// of cells overwritten.
pub fn blank_negative_signals(table: &mut SourceTable, profile: &AssayProfile) -> usize {
    let mut blanked = 0;
    for spec in &profile.channels {
        let (Some(call_idx), Some(rfu_idx)) = (
            table.column_index(&spec.interpretation_column),
            table.column_index(&spec.rfu_column),
        ) else {
            continue;
        };
        let needle = match spec.role {
            ChannelRole::Target => "neg",
            ChannelRole::Internal => "invalid",
        };
        for row in &mut table.rows {
            let blank = row
                .get(call_idx)
                .is_some_and(|call| call.to_lowercase().contains(needle));
            if blank && let Some(cell) = row.get_mut(rfu_idx) {
                *cell = NO_SIGNAL.to_string();
                blanked += 1;
            }
        }
    }
    blanked
}

/// Copies each consolidated field from the representative channel's
/// `<CHANNEL>-<field>` column into an unprefixed column.
pub fn consolidate_fields(table: &mut SourceTable, profile: &AssayProfile) {
    for field in &profile.consolidated_fields {
        let source = profile.representative_channel.prefixed(field);
        let values: Vec<String> = match table.column_index(&source) {
            Some(idx) => (0..table.height())
                .map(|row| table.cell(row, idx).to_string())
                .collect(),
            None => vec![String::new(); table.height()],
        };
        table.set_column(field, values);
    }
}
