//! Output files.
//!
//! Every file is written next to its destination as `<name>.tmp` and then
//! renamed into place, so a failed write never leaves a half-written result.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use csv::{QuoteStyle, WriterBuilder};
use fusion_common::column_strings;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::stats::GroupStatistics;

pub const COMBINED_FILE_NAME: &str = "combined.csv";
pub const STATISTICS_FILE_NAME: &str = "statistics.json";

/// Writes through `write` into a temporary file, then renames it to `path`.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = (|| {
        let file = File::create(&tmp_path)
            .with_context(|| format!("create {}", tmp_path.display()))?;
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer
            .flush()
            .with_context(|| format!("flush {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("rename {} to {}", tmp_path.display(), path.display()))
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Writes a table as CSV with every field quoted.
///
/// Every cell is written as the text it holds, so reading the file back
/// with a CSV reader yields identifiers such as `0000574` unchanged.
pub fn write_combined_csv(path: &Path, data: &DataFrame) -> Result<()> {
    let names: Vec<String> = data
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let columns: Vec<Vec<String>> = names
        .iter()
        .map(|name| column_strings(data, name).unwrap_or_default())
        .collect();

    write_atomic(path, |writer| {
        let mut csv = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(writer);
        csv.write_record(&names)
            .with_context(|| format!("write header to {}", path.display()))?;
        for row in 0..data.height() {
            csv.write_record(columns.iter().map(|column| column[row].as_str()))
                .with_context(|| format!("write row {row} to {}", path.display()))?;
        }
        csv.flush()
            .with_context(|| format!("flush {}", path.display()))?;
        Ok(())
    })?;
    info!(path = %path.display(), rows = data.height(), "wrote combined table");
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsReport<'a> {
    pub generated_at: String,
    pub profile: &'a str,
    pub group_by: &'a str,
    pub groups: &'a [GroupStatistics],
}

impl<'a> StatisticsReport<'a> {
    pub fn new(profile: &'a str, group_by: &'a str, groups: &'a [GroupStatistics]) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            profile,
            group_by,
            groups,
        }
    }
}

pub fn write_statistics_json(path: &Path, report: &StatisticsReport<'_>) -> Result<()> {
    write_atomic(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, report)
            .with_context(|| format!("serialize {}", path.display()))?;
        writeln!(writer).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    })?;
    info!(path = %path.display(), groups = report.groups.len(), "wrote statistics");
    Ok(())
}
