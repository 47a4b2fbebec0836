//! Reshape and join of one PCR/LIS pair into a [`CombinedFrame`].

use std::time::Instant;

use fusion_common::string_frame;
use fusion_ingest::SourceTable;
use fusion_model::AssayProfile;
use fusion_model::columns::{INSTRUMENT_SERIAL, SOFTWARE_VERSION};
use fusion_standards::InstrumentRegistry;
use tracing::{debug, info, info_span};

use crate::cleanup::{blank_negative_signals, consolidate_fields};
use crate::error::{Result, TransformError};
use crate::frame::{CombinedFrame, FrameMeta};
use crate::join::{UnmatchedPolicy, join_sources};
use crate::pivot::pivot_channels;
use crate::prepare::{apply_trims, drop_end_rows, rename_columns, select_columns, specimen_keys};
use crate::schema::{
    engine_columns, missing_columns, required_lis_columns, required_pcr_columns,
    validate_columns,
};

#[derive(Debug, Clone, Default)]
pub struct CombineOptions<'a> {
    pub unmatched: UnmatchedPolicy,
    /// Adds instrument serial and software version columns when present.
    pub instruments: Option<&'a InstrumentRegistry>,
    pub meta: FrameMeta,
}

/// Prepares the PCR export: rename, validate, trim, select, drop the
/// end-of-file row.
pub fn prepare_pcr(mut pcr: SourceTable, profile: &AssayProfile) -> Result<SourceTable> {
    rename_columns(&mut pcr, &profile.pcr);
    validate_columns("PCR", &pcr.headers, &required_pcr_columns(profile))?;
    apply_trims(&mut pcr, &profile.trims);
    let mut selected = select_columns(&pcr, &required_pcr_columns(profile));
    drop_end_rows(&mut selected, profile);
    Ok(selected)
}

/// Prepares the LIS export: rename, validate, select, drop the end-of-file row.
pub fn prepare_lis(mut lis: SourceTable, profile: &AssayProfile) -> Result<SourceTable> {
    rename_columns(&mut lis, &profile.lis);
    validate_columns("LIS", &lis.headers, &required_lis_columns(profile))?;
    let mut selected = select_columns(&lis, &required_lis_columns(profile));
    drop_end_rows(&mut selected, profile);
    Ok(selected)
}

/// Builds the combined table for one pair.
///
/// Stages: prepare both sources, pivot PCR, left-join from LIS, blank
/// negative signals, consolidate representative fields, select the output
/// columns. Schema drift in either source fails the pair with every
/// missing column named.
pub fn combine_pair(
    pcr: SourceTable,
    lis: SourceTable,
    profile: &AssayProfile,
    options: CombineOptions<'_>,
) -> Result<CombinedFrame> {
    let span = info_span!("combine", pair_key = %options.meta.pair_key, profile = %profile.name);
    let _guard = span.enter();
    let start = Instant::now();

    let pcr = prepare_pcr(pcr, profile)?;
    let lis = prepare_lis(lis, profile)?;
    debug!(pcr_rows = pcr.height(), lis_rows = lis.height(), "prepared sources");

    let pivot = pivot_channels(&pcr, profile)?;
    let lis_keys = specimen_keys(&lis, &profile.columns);
    let joined = join_sources(&lis, &lis_keys, &pivot, options.unmatched)?;
    let mut table = joined.table;

    let blanked = blank_negative_signals(&mut table, profile);
    consolidate_fields(&mut table, profile);
    debug!(blanked, "cleaned combined rows");

    let mut output = if profile.output_columns.is_empty() {
        table
    } else {
        validate_columns("combined", &table.headers, &profile.output_columns)?;
        select_columns(&table, &dedup(&profile.output_columns))
    };

    if let Some(registry) = options.instruments {
        add_instrument_columns(&mut output, registry, profile, options.meta.device_id.as_deref());
    }

    let missing = missing_columns(&output.headers, &engine_columns(profile));
    if !missing.is_empty() {
        return Err(TransformError::MissingColumns {
            table: "combined".to_string(),
            columns: missing,
        });
    }

    let data = string_frame(output.into_columns())?;
    info!(
        row_count = data.height(),
        column_count = data.width(),
        duration_ms = start.elapsed().as_millis(),
        "combined pair"
    );

    Ok(CombinedFrame {
        data,
        keys: joined.keys,
        report: joined.report,
        meta: options.meta,
    })
}

fn dedup(columns: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        if !unique.contains(column) {
            unique.push(column.clone());
        }
    }
    unique
}

fn add_instrument_columns(
    table: &mut SourceTable,
    registry: &InstrumentRegistry,
    profile: &AssayProfile,
    device_id: Option<&str>,
) {
    let serial_idx = table.column_index(&profile.columns.serial_number);
    let (serials, versions): (Vec<String>, Vec<String>) = (0..table.height())
        .map(|row| {
            let lis_serial = serial_idx.map_or("", |idx| table.cell(row, idx));
            registry.resolve(device_id.unwrap_or_default(), lis_serial)
        })
        .unzip();
    table.set_column(INSTRUMENT_SERIAL, serials);
    table.set_column(SOFTWARE_VERSION, versions);
}
