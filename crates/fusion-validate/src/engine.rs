//! Rule engine over a combined table.

use std::collections::BTreeMap;
use std::time::Instant;

use fusion_common::{column_strings, column_value_string, with_string_columns};
use fusion_model::columns::{
    OVERALL_RESULT, SAMPLE_CATEGORY, pq_column, truth_column, validity_column,
};
use fusion_model::{AssayProfile, CallResult, IcStatus, OverallResult, SpecimenKey, TruthFlag};
use fusion_transform::{CombinedFrame, FrameMeta, JoinReport, engine_columns, missing_columns};
use polars::prelude::DataFrame;
use tracing::{debug, info, info_span};

use crate::error::{Result, ValidateError};
use crate::labels::LabelMatcher;
use crate::stages::{QualifiedSpecimen, SpecimenRecord, run_stages};

/// A combined table with the derived verdict columns appended.
#[derive(Debug, Clone)]
pub struct QualifiedFrame {
    pub data: DataFrame,
    pub specimens: Vec<QualifiedSpecimen>,
    pub report: JoinReport,
    pub meta: FrameMeta,
}

impl QualifiedFrame {
    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    pub fn value(&self, column: &str, row: usize) -> String {
        column_value_string(&self.data, column, row)
    }

    pub fn failed_count(&self) -> usize {
        self.specimens
            .iter()
            .filter(|specimen| specimen.overall == OverallResult::Fail)
            .count()
    }
}

/// Applies the qualification stages of one assay profile.
///
/// The engine holds the profile and its compiled label rules; evaluation
/// never mutates either, so one engine serves every pair of a batch.
pub struct RuleEngine<'a> {
    profile: &'a AssayProfile,
    labels: LabelMatcher,
}

impl<'a> RuleEngine<'a> {
    pub fn new(profile: &'a AssayProfile) -> Result<Self> {
        Ok(Self {
            profile,
            labels: LabelMatcher::new(&profile.labels)?,
        })
    }

    pub fn profile(&self) -> &AssayProfile {
        self.profile
    }

    pub fn labels(&self) -> &LabelMatcher {
        &self.labels
    }

    /// Names of the derived columns, in the order they are appended.
    pub fn derived_column_names(&self) -> Vec<String> {
        let mut names = vec![SAMPLE_CATEGORY.to_string()];
        for spec in self.profile.target_channels() {
            names.push(truth_column(spec.channel));
            names.push(validity_column(spec.channel));
        }
        for spec in &self.profile.channels {
            names.push(pq_column(spec.channel));
        }
        names.push(OVERALL_RESULT.to_string());
        names
    }

    /// Fails with every rule input column absent from `data`.
    pub fn check_columns(&self, data: &DataFrame) -> Result<()> {
        let headers: Vec<String> = data
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let columns = missing_columns(&headers, &engine_columns(self.profile));
        if columns.is_empty() {
            Ok(())
        } else {
            Err(ValidateError::MissingColumns { columns })
        }
    }

    /// Reads the rule inputs of every row.
    pub fn records(&self, data: &DataFrame) -> Result<Vec<SpecimenRecord>> {
        self.check_columns(data)?;
        let height = data.height();
        let read = |name: &str| {
            column_strings(data, name).unwrap_or_else(|| vec![String::new(); height])
        };
        let columns = &self.profile.columns;
        let barcodes = read(&columns.barcode);
        let run_ids = read(&columns.run_id);
        let orders = read(&columns.test_order);
        let sample_types = read(&columns.sample_type);
        let calls: Vec<_> = self
            .profile
            .target_channels()
            .map(|spec| (spec.channel, read(&spec.interpretation_column)))
            .collect();
        let ic = self
            .profile
            .internal_control()
            .map(|spec| read(&spec.interpretation_column));
        let rfu: Vec<_> = self
            .profile
            .channels
            .iter()
            .map(|spec| (spec.channel, read(&spec.rfu_column)))
            .collect();

        let records = (0..height)
            .map(|row| SpecimenRecord {
                row,
                key: SpecimenKey::new(
                    barcodes[row].clone(),
                    run_ids[row].clone(),
                    orders[row].clone(),
                ),
                sample_type: sample_types[row].clone(),
                calls: calls
                    .iter()
                    .map(|(channel, values)| (*channel, CallResult::parse(&values[row])))
                    .collect(),
                // Without an internal control channel there is nothing to invalidate.
                ic: ic
                    .as_ref()
                    .map_or(IcStatus::Valid, |values| IcStatus::parse(&values[row])),
                rfu: rfu
                    .iter()
                    .map(|(channel, values)| (*channel, values[row].clone()))
                    .collect::<BTreeMap<_, _>>(),
            })
            .collect();
        Ok(records)
    }

    /// Runs stages 1 to 5 over every row of `data`.
    pub fn evaluate(&self, data: &DataFrame) -> Result<Vec<QualifiedSpecimen>> {
        Ok(run_stages(self.records(data)?, &self.labels, self.profile))
    }

    /// Text values of the derived columns for `specimens`.
    pub fn derived_columns(&self, specimens: &[QualifiedSpecimen]) -> Vec<(String, Vec<String>)> {
        let mut columns = vec![(
            SAMPLE_CATEGORY.to_string(),
            specimens
                .iter()
                .map(|specimen| specimen.category.as_str().to_string())
                .collect(),
        )];
        for spec in self.profile.target_channels() {
            let channel = spec.channel;
            columns.push((
                truth_column(channel),
                specimens
                    .iter()
                    .map(|specimen| {
                        TruthFlag::cell(specimen.truths.get(&channel).copied().flatten())
                            .to_string()
                    })
                    .collect(),
            ));
            columns.push((
                validity_column(channel),
                specimens
                    .iter()
                    .map(|specimen| {
                        specimen
                            .validity
                            .get(&channel)
                            .map_or_else(String::new, |validity| validity.as_str().to_string())
                    })
                    .collect(),
            ));
        }
        for spec in &self.profile.channels {
            let channel = spec.channel;
            columns.push((
                pq_column(channel),
                specimens
                    .iter()
                    .map(|specimen| {
                        specimen
                            .pq
                            .get(&channel)
                            .map_or_else(String::new, |result| result.as_str().to_string())
                    })
                    .collect(),
            ));
        }
        columns.push((
            OVERALL_RESULT.to_string(),
            specimens
                .iter()
                .map(|specimen| specimen.overall.as_str().to_string())
                .collect(),
        ));
        columns
    }

    /// Appends (or replaces) the derived columns on `data`.
    pub fn qualify_data(&self, data: &DataFrame) -> Result<(DataFrame, Vec<QualifiedSpecimen>)> {
        let specimens = self.evaluate(data)?;
        let derived = self.derived_columns(&specimens);
        let data = with_string_columns(data, derived)?;
        Ok((data, specimens))
    }

    pub fn qualify(&self, frame: &CombinedFrame) -> Result<QualifiedFrame> {
        let span = info_span!("qualify", pair_key = %frame.meta.pair_key);
        let _guard = span.enter();
        let start = Instant::now();

        let (data, specimens) = self.qualify_data(&frame.data)?;
        let qualified = QualifiedFrame {
            data,
            specimens,
            report: frame.report.clone(),
            meta: frame.meta.clone(),
        };
        debug!(
            derived_columns = self.derived_column_names().len(),
            "appended verdict columns"
        );
        info!(
            row_count = qualified.record_count(),
            failed = qualified.failed_count(),
            duration_ms = start.elapsed().as_millis(),
            "qualified specimens"
        );
        Ok(qualified)
    }
}
