//! Per-group, per-channel statistics over qualified tables.
//!
//! Only rows whose sample type is the profile's specimen type take part, and
//! lab controls matched by the profile's control patterns are skipped. Call
//! counts cover every such row; signal summaries use VALID rows only, split
//! by sample category, and ignore no-call markers and non-numeric text.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow, bail};
use fusion_common::{column_strings, parse_f64};
use fusion_model::columns::{SAMPLE_CATEGORY, pq_column, truth_column, validity_column};
use fusion_model::{
    AssayProfile, Channel, ChannelSpec, IcStatus, PqResult, SampleCategory, TruthFlag, Validity,
};
use fusion_validate::LabelMatcher;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::debug;

/// Count, mean and sample standard deviation of one numeric field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub n: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation; needs at least two values.
    pub std_dev: Option<f64>,
}

impl Summary {
    pub fn from_values(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self::default();
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let std_dev = (n > 1).then(|| {
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            variance.sqrt()
        });
        Self {
            n,
            mean: Some(mean),
            std_dev,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CallCounts {
    pub count: usize,
    /// VALID and within the PQ threshold.
    pub pass: usize,
    /// VALID but outside the PQ threshold.
    pub fail: usize,
    pub invalid: usize,
    pub false_calls: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStatistics {
    pub counts: CallCounts,
    pub rfu: Summary,
    pub ct: Summary,
    pub baseline: Summary,
    pub slope: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelStatistics {
    pub channel: Channel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyte: Option<String>,
    pub counts: CallCounts,
    pub positive: CategoryStatistics,
    pub negative: CategoryStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatistics {
    pub group: String,
    /// Specimen rows counted in this group.
    pub specimens: usize,
    pub channels: Vec<ChannelStatistics>,
}

/// One channel's fields for one row.
struct ChannelRow {
    valid: bool,
    pq: PqResult,
    false_call: bool,
    rfu: String,
    ct: String,
    baseline: String,
    slope: String,
}

/// Column readers for one channel.
struct ChannelColumns<'a> {
    spec: &'a ChannelSpec,
    validity: Vec<String>,
    pq: Vec<String>,
    truth: Vec<String>,
    rfu: Vec<String>,
    ct: Vec<String>,
    baseline: Vec<String>,
    slope: Vec<String>,
}

impl ChannelColumns<'_> {
    fn row(&self, idx: usize) -> Result<ChannelRow> {
        let channel = self.spec.channel;
        // Internal control validity is its own interpretation.
        let valid = if self.spec.is_target() {
            self.validity[idx]
                .parse::<Validity>()
                .map_err(|err| anyhow!("row {idx}, {channel}: {err}"))?
                .is_valid()
        } else {
            IcStatus::parse(&self.validity[idx]).is_valid()
        };
        let pq = self.pq[idx]
            .parse::<PqResult>()
            .map_err(|err| anyhow!("row {idx}, {channel}: {err}"))?;
        Ok(ChannelRow {
            valid,
            pq,
            false_call: TruthFlag::from_cell(&self.truth[idx]).is_some(),
            rfu: self.rfu[idx].clone(),
            ct: self.ct[idx].clone(),
            baseline: self.baseline[idx].clone(),
            slope: self.slope[idx].clone(),
        })
    }
}

/// Every column the statistics read, in a stable order.
fn statistics_columns(profile: &AssayProfile) -> Vec<String> {
    let columns = &profile.columns;
    let mut names = vec![
        columns.barcode.clone(),
        columns.sample_type.clone(),
        SAMPLE_CATEGORY.to_string(),
    ];
    for spec in &profile.channels {
        if spec.is_target() {
            names.push(validity_column(spec.channel));
            names.push(truth_column(spec.channel));
        } else {
            names.push(spec.interpretation_column.clone());
        }
        names.push(pq_column(spec.channel));
        names.push(spec.rfu_column.clone());
        names.push(spec.ct_column.clone());
        names.push(spec.channel.prefixed(&columns.baseline));
        names.push(spec.channel.prefixed(&columns.slope));
    }
    names
}

/// Aggregates a qualified (possibly multi-run) table by `group_by`.
pub fn compute_statistics(
    data: &DataFrame,
    profile: &AssayProfile,
    labels: &LabelMatcher,
    group_by: &str,
) -> Result<Vec<GroupStatistics>> {
    let height = data.height();
    let Some(groups) = column_strings(data, group_by) else {
        bail!("group-by column '{group_by}' not found in the combined table");
    };
    let missing: Vec<String> = statistics_columns(profile)
        .into_iter()
        .filter(|name| data.column(name).is_err())
        .collect();
    if !missing.is_empty() {
        bail!(
            "combined table is missing columns needed for statistics: {}",
            missing.join(", ")
        );
    }
    let read =
        |name: &str| column_strings(data, name).unwrap_or_else(|| vec![String::new(); height]);
    let barcodes = read(&profile.columns.barcode);
    let sample_types = read(&profile.columns.sample_type);
    let categories = read(SAMPLE_CATEGORY);

    let channels: Vec<ChannelColumns<'_>> = profile
        .channels
        .iter()
        .map(|spec| ChannelColumns {
            spec,
            validity: if spec.is_target() {
                read(&validity_column(spec.channel))
            } else {
                read(&spec.interpretation_column)
            },
            pq: read(&pq_column(spec.channel)),
            truth: read(&truth_column(spec.channel)),
            rfu: read(&spec.rfu_column),
            ct: read(&spec.ct_column),
            baseline: read(&spec.channel.prefixed(&profile.columns.baseline)),
            slope: read(&spec.channel.prefixed(&profile.columns.slope)),
        })
        .collect();

    let mut rows_by_group: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for idx in 0..height {
        let is_specimen = sample_types[idx]
            .trim()
            .eq_ignore_ascii_case(&profile.specimen_sample_type);
        if !is_specimen || labels.is_control(&barcodes[idx]) {
            continue;
        }
        rows_by_group.entry(groups[idx].as_str()).or_default().push(idx);
    }

    let mut statistics = Vec::with_capacity(rows_by_group.len());
    for (group, rows) in rows_by_group {
        debug!(group, specimens = rows.len(), "aggregating group");
        let channels = channels
            .iter()
            .map(|columns| channel_statistics(profile, columns, &categories, &rows))
            .collect::<Result<Vec<_>>>()?;
        statistics.push(GroupStatistics {
            group: group.to_string(),
            specimens: rows.len(),
            channels,
        });
    }
    Ok(statistics)
}

fn channel_statistics(
    profile: &AssayProfile,
    columns: &ChannelColumns<'_>,
    categories: &[String],
    rows: &[usize],
) -> Result<ChannelStatistics> {
    let mut counts = CallCounts::default();
    let mut positive = Vec::new();
    let mut negative = Vec::new();
    for &idx in rows {
        let row = columns.row(idx)?;
        tally(&mut counts, &row);
        match categories[idx].parse::<SampleCategory>() {
            Ok(SampleCategory::Positive) => positive.push(row),
            Ok(SampleCategory::Negative) => negative.push(row),
            _ => {}
        }
    }
    Ok(ChannelStatistics {
        channel: columns.spec.channel,
        analyte: columns.spec.analyte.clone(),
        counts,
        positive: category_statistics(profile, &positive),
        negative: category_statistics(profile, &negative),
    })
}

fn tally(counts: &mut CallCounts, row: &ChannelRow) {
    counts.count += 1;
    if !row.valid {
        counts.invalid += 1;
    } else if row.pq.is_pass() {
        counts.pass += 1;
    } else {
        counts.fail += 1;
    }
    if row.false_call {
        counts.false_calls += 1;
    }
}

fn category_statistics(profile: &AssayProfile, rows: &[ChannelRow]) -> CategoryStatistics {
    let mut counts = CallCounts::default();
    for row in rows {
        tally(&mut counts, row);
    }
    let valid: Vec<&ChannelRow> = rows.iter().filter(|row| row.valid).collect();
    let summarize = |field: fn(&ChannelRow) -> &String| {
        let values: Vec<f64> = valid
            .iter()
            .map(|row| field(row))
            .filter(|value| !profile.is_no_call(value))
            .filter_map(|value| parse_f64(value))
            .collect();
        Summary::from_values(&values)
    };
    CategoryStatistics {
        counts,
        rfu: summarize(rfu_field),
        ct: summarize(ct_field),
        baseline: summarize(baseline_field),
        slope: summarize(slope_field),
    }
}

fn rfu_field(row: &ChannelRow) -> &String {
    &row.rfu
}

fn ct_field(row: &ChannelRow) -> &String {
    &row.ct
}

fn baseline_field(row: &ChannelRow) -> &String {
    &row.baseline
}

fn slope_field(row: &ChannelRow) -> &String {
    &row.slope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_uses_sample_std_dev() {
        let summary = Summary::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(summary.n, 8);
        assert_eq!(summary.mean, Some(5.0));
        let std_dev = summary.std_dev.unwrap();
        assert!((std_dev - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn test_summary_small_samples() {
        assert_eq!(Summary::from_values(&[]), Summary::default());
        let one = Summary::from_values(&[3.5]);
        assert_eq!(one.mean, Some(3.5));
        assert_eq!(one.std_dev, None);
    }
}
