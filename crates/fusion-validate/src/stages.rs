//! Typed stage pipeline.
//!
//! Each stage consumes the previous stage's records and returns new records
//! carrying one more set of derived fields, so a stage can only run once the
//! fields it reads exist:
//!
//! ```text
//! SpecimenRecord -> Labeled -> FalseCalled -> Validated -> Thresholded -> QualifiedSpecimen
//! ```

use std::collections::BTreeMap;

use fusion_model::{
    AssayProfile, CallResult, Channel, IcStatus, OverallResult, PqResult, SampleCategory,
    SpecimenKey, TruthFlag, Validity,
};
use serde::Serialize;

use crate::labels::LabelMatcher;
use crate::rules::{channel_validity, overall_verdict, pq_threshold, truth_flag};

/// The fields of one combined row that the rules read.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecimenRecord {
    /// Row index in the combined table.
    pub row: usize,
    pub key: SpecimenKey,
    pub sample_type: String,
    /// Calls of the target channels.
    pub calls: BTreeMap<Channel, CallResult>,
    pub ic: IcStatus,
    /// Rounded RFU range of every channel, as text.
    pub rfu: BTreeMap<Channel, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Labeled {
    pub record: SpecimenRecord,
    pub category: SampleCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FalseCalled {
    pub labeled: Labeled,
    pub truths: BTreeMap<Channel, Option<TruthFlag>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub called: FalseCalled,
    pub validity: BTreeMap<Channel, Validity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thresholded {
    pub validated: Validated,
    pub pq: BTreeMap<Channel, PqResult>,
}

/// A specimen with every derived field resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualifiedSpecimen {
    #[serde(skip)]
    pub row: usize,
    pub key: SpecimenKey,
    pub sample_type: String,
    pub category: SampleCategory,
    pub truths: BTreeMap<Channel, Option<TruthFlag>>,
    pub validity: BTreeMap<Channel, Validity>,
    pub pq: BTreeMap<Channel, PqResult>,
    pub overall: OverallResult,
}

impl QualifiedSpecimen {
    pub fn has_invalid_channel(&self) -> bool {
        self.validity.values().any(|validity| !validity.is_valid())
    }

    pub fn has_false_call(&self) -> bool {
        self.truths.values().any(Option::is_some)
    }

    pub fn pq_failures(&self) -> impl Iterator<Item = Channel> + '_ {
        self.pq
            .iter()
            .filter(|(_, result)| !result.is_pass())
            .map(|(channel, _)| *channel)
    }
}

/// Stage 1.
pub fn label(records: Vec<SpecimenRecord>, labels: &LabelMatcher) -> Vec<Labeled> {
    records
        .into_iter()
        .map(|record| {
            let category = labels.classify(&record.key.barcode);
            Labeled { record, category }
        })
        .collect()
}

/// Stage 2.
pub fn detect_false_calls(labeled: Vec<Labeled>) -> Vec<FalseCalled> {
    labeled
        .into_iter()
        .map(|labeled| {
            let truths = labeled
                .record
                .calls
                .iter()
                .map(|(channel, call)| (*channel, truth_flag(labeled.category, *call)))
                .collect();
            FalseCalled { labeled, truths }
        })
        .collect()
}

/// Stage 3.
pub fn validate(called: Vec<FalseCalled>) -> Vec<Validated> {
    called
        .into_iter()
        .map(|called| {
            let record = &called.labeled.record;
            let validity = record
                .calls
                .iter()
                .map(|(channel, call)| {
                    (
                        *channel,
                        channel_validity(called.labeled.category, *call, record.ic),
                    )
                })
                .collect();
            Validated { called, validity }
        })
        .collect()
}

/// Stage 4.
pub fn apply_thresholds(validated: Vec<Validated>, profile: &AssayProfile) -> Vec<Thresholded> {
    validated
        .into_iter()
        .map(|validated| {
            let category = validated.called.labeled.category;
            let pq = validated
                .called
                .labeled
                .record
                .rfu
                .iter()
                .map(|(channel, rfu)| {
                    let threshold = profile.threshold(category, *channel);
                    (*channel, pq_threshold(threshold, rfu))
                })
                .collect();
            Thresholded { validated, pq }
        })
        .collect()
}

/// Stage 5.
pub fn conclude(thresholded: Vec<Thresholded>) -> Vec<QualifiedSpecimen> {
    thresholded
        .into_iter()
        .map(|thresholded| {
            let Thresholded { validated, pq } = thresholded;
            let Validated { called, validity } = validated;
            let FalseCalled { labeled, truths } = called;
            let Labeled { record, category } = labeled;
            let overall = overall_verdict(validity.values(), truths.values(), pq.values());
            QualifiedSpecimen {
                row: record.row,
                key: record.key,
                sample_type: record.sample_type,
                category,
                truths,
                validity,
                pq,
                overall,
            }
        })
        .collect()
}

/// Runs stages 1 to 5 in order.
pub fn run_stages(
    records: Vec<SpecimenRecord>,
    labels: &LabelMatcher,
    profile: &AssayProfile,
) -> Vec<QualifiedSpecimen> {
    let labeled = label(records, labels);
    let called = detect_false_calls(labeled);
    let validated = validate(called);
    let thresholded = apply_thresholds(validated, profile);
    conclude(thresholded)
}
