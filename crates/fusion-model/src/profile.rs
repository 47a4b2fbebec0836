//! Assay profile: the immutable rulebook for one assay.
//!
//! A profile names every instrument column the pipeline touches, the
//! channel table, identifier trim rules, label rules, PQ thresholds and
//! run acceptance limits. Profiles are deserialized from TOML and checked
//! once with [`AssayProfile::validate`] before use.

use std::collections::{BTreeMap, BTreeSet};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::channel::{Channel, ChannelRole};
use crate::error::{ModelError, Result};
use crate::verdict::SampleCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssayProfile {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Barcode text marking the instrument's end-of-file row.
    #[serde(default = "default_end_marker")]
    pub end_marker: String,
    /// Non-numeric values excluded from statistics.
    #[serde(default = "default_no_call_markers")]
    pub no_call_markers: Vec<String>,
    /// `Sample Type` value of patient/panel specimens; anything else is a control.
    #[serde(default = "default_specimen_sample_type")]
    pub specimen_sample_type: String,
    #[serde(default)]
    pub columns: CanonicalColumns,
    pub pcr: SourceLayout,
    pub lis: SourceLayout,
    pub channels: Vec<ChannelSpec>,
    #[serde(default)]
    pub trims: Vec<TrimRule>,
    /// Channel whose copy of each consolidated field is kept.
    pub representative_channel: Channel,
    #[serde(default)]
    pub consolidated_fields: Vec<String>,
    /// Column allow-list of the combined table. Empty keeps every column.
    #[serde(default)]
    pub output_columns: Vec<String>,
    pub labels: LabelRules,
    #[serde(default)]
    pub thresholds: Vec<ThresholdRule>,
    #[serde(default)]
    pub acceptance: AcceptanceRules,
}

fn default_end_marker() -> String {
    "[end]".to_string()
}

fn default_no_call_markers() -> Vec<String> {
    vec!["-".to_string(), "Invalid".to_string()]
}

fn default_specimen_sample_type() -> String {
    "Specimen".to_string()
}

/// Canonical names of the identity and per-channel PCR fields after renaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanonicalColumns {
    pub barcode: String,
    pub run_id: String,
    pub test_order: String,
    pub channel: String,
    pub sample_type: String,
    pub serial_number: String,
    pub rfu_range: String,
    pub ct: String,
    pub baseline: String,
    pub slope: String,
}

impl Default for CanonicalColumns {
    fn default() -> Self {
        Self {
            barcode: "Specimen Barcode".to_string(),
            run_id: "Run ID".to_string(),
            test_order: "Test order #".to_string(),
            channel: "Channel".to_string(),
            sample_type: "Sample Type".to_string(),
            serial_number: "Serial Number".to_string(),
            rfu_range: "Unrounded RFU Range".to_string(),
            ct: "Unrounded Ct".to_string(),
            baseline: "EstimatedBaseline".to_string(),
            slope: "LR_TSlope_NonNormalized".to_string(),
        }
    }
}

impl CanonicalColumns {
    /// The three key columns, in key order.
    pub fn key_columns(&self) -> [&str; 3] {
        [&self.barcode, &self.run_id, &self.test_order]
    }
}

/// Per-source loading and renaming rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceLayout {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Instrument-native name to canonical name.
    #[serde(default)]
    pub renames: BTreeMap<String, String>,
    /// Columns kept after renaming.
    #[serde(default)]
    pub keep_columns: Vec<String>,
}

fn default_delimiter() -> char {
    ','
}

impl SourceLayout {
    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Option<u8> {
        u8::try_from(self.delimiter).ok().filter(u8::is_ascii)
    }

    /// Canonical name for an instrument column.
    pub fn canonical_name<'a>(&'a self, column: &'a str) -> &'a str {
        self.renames.get(column).map_or(column, String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelSpec {
    pub channel: Channel,
    pub role: ChannelRole,
    /// Analyte detected on a target channel, e.g. `HPIV-1`.
    #[serde(default)]
    pub analyte: Option<String>,
    /// LIS interpretation column (POS/NEG/Invalid, or Valid/Invalid for IC).
    pub interpretation_column: String,
    pub ct_column: String,
    pub rfu_column: String,
}

impl ChannelSpec {
    pub fn is_target(&self) -> bool {
        matches!(self.role, ChannelRole::Target)
    }
}

/// Strip `front` characters from the start and `back` from the end of a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrimRule {
    pub column: String,
    #[serde(default)]
    pub front: usize,
    #[serde(default)]
    pub back: usize,
}

impl TrimRule {
    /// Character-based trim; an over-long trim yields an empty string.
    pub fn apply(&self, value: &str) -> String {
        let len = value.chars().count();
        if self.front + self.back >= len {
            return String::new();
        }
        value
            .chars()
            .skip(self.front)
            .take(len - self.front - self.back)
            .collect()
    }
}

/// Barcode-based labeling rules for positive and negative specimens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelRules {
    /// Case-insensitive substrings marking a positive (panel) specimen.
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
    /// Positive-control barcode pattern.
    #[serde(default)]
    pub positive_pattern: Option<String>,
    #[serde(default)]
    pub negative_pattern: Option<String>,
    /// Further control barcode patterns that never label a specimen but
    /// exclude it from specimen statistics.
    #[serde(default)]
    pub control_patterns: Vec<String>,
}

/// Compiles a label or control pattern, case-insensitively.
pub fn compile_pattern(field: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| ModelError::InvalidPattern {
            field: field.to_string(),
            pattern: pattern.to_string(),
            message: err.to_string(),
        })
}

/// How a threshold pair is compared against a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    GreaterThanMin,
    LessThanMax,
    Between,
}

/// A PQ threshold pair; either bound may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Threshold {
    pub const NONE: Threshold = Threshold {
        min: None,
        max: None,
    };

    pub fn mode(&self) -> Option<ComparisonMode> {
        match (self.min, self.max) {
            (None, None) => None,
            (Some(_), None) => Some(ComparisonMode::GreaterThanMin),
            (None, Some(_)) => Some(ComparisonMode::LessThanMax),
            (Some(_), Some(_)) => Some(ComparisonMode::Between),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.mode().is_none()
    }

    /// Strict comparison of `value` against the configured bound(s).
    pub fn passes(&self, value: f64) -> bool {
        match (self.min, self.max) {
            (None, None) => true,
            (Some(min), None) => value > min,
            (None, Some(max)) => value < max,
            (Some(min), Some(max)) => min < value && value < max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdRule {
    pub category: SampleCategory,
    pub channel: Channel,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl ThresholdRule {
    pub fn threshold(&self) -> Threshold {
        Threshold {
            min: self.min,
            max: self.max,
        }
    }
}

/// Run-level acceptance limits. A run is rejected when a count exceeds its limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcceptanceRules {
    pub max_invalid_positives: usize,
    pub max_invalid_negatives: usize,
    pub max_false_calls: usize,
    pub max_pq_failures: usize,
    pub pq_allowances: Vec<PqAllowance>,
}

impl Default for AcceptanceRules {
    fn default() -> Self {
        Self {
            max_invalid_positives: 1,
            max_invalid_negatives: 1,
            max_false_calls: 1,
            max_pq_failures: 1,
            pq_allowances: Vec::new(),
        }
    }
}

impl AcceptanceRules {
    /// PQ failures tolerated for `channel`.
    pub fn pq_allowance(&self, channel: Channel) -> usize {
        self.pq_allowances
            .iter()
            .find(|allowance| allowance.channel == channel)
            .map_or(self.max_pq_failures, |allowance| allowance.max_failures)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PqAllowance {
    pub channel: Channel,
    pub max_failures: usize,
}

impl AssayProfile {
    /// True when `name` is the profile name or one of its aliases (case-insensitive).
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.name.eq_ignore_ascii_case(name)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    }

    pub fn channel(&self, channel: Channel) -> Option<&ChannelSpec> {
        self.channels.iter().find(|spec| spec.channel == channel)
    }

    pub fn target_channels(&self) -> impl Iterator<Item = &ChannelSpec> {
        self.channels.iter().filter(|spec| spec.is_target())
    }

    pub fn internal_control(&self) -> Option<&ChannelSpec> {
        self.channels
            .iter()
            .find(|spec| matches!(spec.role, ChannelRole::Internal))
    }

    /// Threshold pair for a category and channel; unconfigured pairs are unbounded.
    pub fn threshold(&self, category: SampleCategory, channel: Channel) -> Threshold {
        self.thresholds
            .iter()
            .find(|rule| rule.category == category && rule.channel == channel)
            .map_or(Threshold::NONE, ThresholdRule::threshold)
    }

    pub fn is_no_call(&self, value: &str) -> bool {
        let value = value.trim();
        self.no_call_markers
            .iter()
            .any(|marker| marker.eq_ignore_ascii_case(value))
    }

    pub fn is_end_marker(&self, barcode: &str) -> bool {
        !self.end_marker.is_empty() && barcode.contains(&self.end_marker)
    }

    /// Structural checks that deserialization cannot express.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| ModelError::InvalidProfile {
            profile: self.name.clone(),
            message,
        };

        if self.channels.is_empty() {
            return Err(invalid("no channels configured".to_string()));
        }
        let mut seen = BTreeSet::new();
        for spec in &self.channels {
            if !seen.insert(spec.channel) {
                return Err(invalid(format!("channel {} listed twice", spec.channel)));
            }
        }
        let internal = self
            .channels
            .iter()
            .filter(|spec| matches!(spec.role, ChannelRole::Internal))
            .count();
        if internal > 1 {
            return Err(invalid(
                "more than one internal control channel".to_string(),
            ));
        }
        if self.channel(self.representative_channel).is_none() {
            return Err(invalid(format!(
                "representative channel {} is not in the channel table",
                self.representative_channel
            )));
        }
        for (source, layout) in [("pcr", &self.pcr), ("lis", &self.lis)] {
            if layout.delimiter_byte().is_none() {
                return Err(invalid(format!(
                    "{source} delimiter {:?} is not a single ASCII character",
                    layout.delimiter
                )));
            }
        }

        let mut pairs = BTreeSet::new();
        for rule in &self.thresholds {
            if !rule.category.is_labeled() {
                return Err(invalid(format!(
                    "threshold for {} must name POS or NEG",
                    rule.channel
                )));
            }
            if !pairs.insert((rule.category, rule.channel)) {
                return Err(invalid(format!(
                    "duplicate {} threshold for {}",
                    rule.category, rule.channel
                )));
            }
            if let (Some(min), Some(max)) = (rule.min, rule.max)
                && min >= max
            {
                return Err(invalid(format!(
                    "{} threshold for {} has min {min} >= max {max}",
                    rule.category, rule.channel
                )));
            }
        }

        if let Some(pattern) = &self.labels.positive_pattern {
            compile_pattern("positive_pattern", pattern)?;
        }
        if let Some(pattern) = &self.labels.negative_pattern {
            compile_pattern("negative_pattern", pattern)?;
        }
        for pattern in &self.labels.control_patterns {
            compile_pattern("control_patterns", pattern)?;
        }
        Ok(())
    }
}
