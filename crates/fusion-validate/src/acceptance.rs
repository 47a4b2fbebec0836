//! Run-level acceptance over qualified control specimens.
//!
//! Only labeled specimens (positive panels and negative controls) take part.
//! A run is rejected when any category collects more specimens than the
//! profile's [`AcceptanceRules`] tolerate.

use std::collections::BTreeMap;
use std::fmt;

use fusion_model::{AcceptanceRules, Channel, SampleCategory, SpecimenKey};
use serde::Serialize;

use crate::stages::QualifiedSpecimen;

/// Why a run was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    InvalidPositives,
    InvalidNegatives,
    FalseCalls,
    PqThreshold,
}

impl RejectionReason {
    /// Header text used in the PQ results file.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::InvalidPositives => "INVALID POSITIVES",
            RejectionReason::InvalidNegatives => "INVALID NEGATIVES",
            RejectionReason::FalseCalls => "FALSE POSITIVES/NEGATIVES",
            RejectionReason::PqThreshold => "DID NOT MEET PQ THRESHOLD",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunAssessment {
    /// Positive controls with at least one INVALID channel.
    pub invalid_positives: Vec<SpecimenKey>,
    /// Negative controls with at least one INVALID channel.
    pub invalid_negatives: Vec<SpecimenKey>,
    /// Controls carrying a false positive or false negative flag.
    pub false_calls: Vec<SpecimenKey>,
    /// Positive controls failing the PQ threshold, per channel.
    pub pq_failures: BTreeMap<Channel, Vec<SpecimenKey>>,
    /// Channels whose PQ failures exceed their allowance.
    pub failed_channels: Vec<Channel>,
    pub rejections: Vec<RejectionReason>,
}

impl RunAssessment {
    pub fn is_accepted(&self) -> bool {
        self.rejections.is_empty()
    }

    /// Specimens behind a rejection reason; PQ failures are flattened over
    /// the failed channels.
    pub fn specimens_for(&self, reason: RejectionReason) -> Vec<&SpecimenKey> {
        match reason {
            RejectionReason::InvalidPositives => self.invalid_positives.iter().collect(),
            RejectionReason::InvalidNegatives => self.invalid_negatives.iter().collect(),
            RejectionReason::FalseCalls => self.false_calls.iter().collect(),
            RejectionReason::PqThreshold => self
                .failed_channels
                .iter()
                .filter_map(|channel| self.pq_failures.get(channel))
                .flatten()
                .collect(),
        }
    }
}

pub fn assess_run(specimens: &[QualifiedSpecimen], rules: &AcceptanceRules) -> RunAssessment {
    let mut assessment = RunAssessment::default();
    for specimen in specimens {
        match specimen.category {
            SampleCategory::Positive => {
                if specimen.has_invalid_channel() {
                    assessment.invalid_positives.push(specimen.key.clone());
                }
                for channel in specimen.pq_failures() {
                    assessment
                        .pq_failures
                        .entry(channel)
                        .or_default()
                        .push(specimen.key.clone());
                }
            }
            SampleCategory::Negative => {
                if specimen.has_invalid_channel() {
                    assessment.invalid_negatives.push(specimen.key.clone());
                }
            }
            SampleCategory::Unclassified => continue,
        }
        if specimen.has_false_call() {
            assessment.false_calls.push(specimen.key.clone());
        }
    }

    assessment.failed_channels = assessment
        .pq_failures
        .iter()
        .filter(|(channel, keys)| keys.len() > rules.pq_allowance(**channel))
        .map(|(channel, _)| *channel)
        .collect();

    if assessment.invalid_positives.len() > rules.max_invalid_positives {
        assessment.rejections.push(RejectionReason::InvalidPositives);
    }
    if assessment.invalid_negatives.len() > rules.max_invalid_negatives {
        assessment.rejections.push(RejectionReason::InvalidNegatives);
    }
    if assessment.false_calls.len() > rules.max_false_calls {
        assessment.rejections.push(RejectionReason::FalseCalls);
    }
    if !assessment.failed_channels.is_empty() {
        assessment.rejections.push(RejectionReason::PqThreshold);
    }
    assessment
}
