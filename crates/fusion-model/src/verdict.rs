//! Interpretation calls and the verdict values derived by the rule engine.
//!
//! Source interpretations are free text ("Positive", "NEG", "Invalid", ...).
//! They are classified into closed enums once, so every downstream rule
//! handles each case explicitly instead of re-matching substrings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A target channel's interpretation as reported by the LIS export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallResult {
    Positive,
    Negative,
    Invalid,
    /// Empty or unrecognized interpretation.
    NoCall,
}

impl CallResult {
    /// Classifies interpretation text, case-insensitively.
    ///
    /// `invalid` is checked first so that text such as "Invalid (neg IC)"
    /// never reads as a negative call.
    pub fn parse(text: &str) -> Self {
        let lower = text.trim().to_lowercase();
        if lower.contains("invalid") {
            CallResult::Invalid
        } else if lower.contains("neg") {
            CallResult::Negative
        } else if lower.contains("pos") {
            CallResult::Positive
        } else {
            CallResult::NoCall
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallResult::Positive => "Positive",
            CallResult::Negative => "Negative",
            CallResult::Invalid => "Invalid",
            CallResult::NoCall => "",
        }
    }
}

impl fmt::Display for CallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Internal-control validity for a specimen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IcStatus {
    Valid,
    Invalid,
    Missing,
}

impl IcStatus {
    /// Classifies the IC interpretation; `valid` must appear as a word.
    pub fn parse(text: &str) -> Self {
        let lower = text.trim().to_lowercase();
        if lower.contains("invalid") {
            IcStatus::Invalid
        } else if lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "valid")
        {
            IcStatus::Valid
        } else {
            IcStatus::Missing
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, IcStatus::Valid)
    }
}

/// Expected outcome of a specimen, derived from its barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SampleCategory {
    #[serde(rename = "POS")]
    Positive,
    #[serde(rename = "NEG")]
    Negative,
    #[serde(rename = "UNCLASSIFIED")]
    Unclassified,
}

impl SampleCategory {
    /// Value written to the `Sample Category` column. Unclassified is blank.
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleCategory::Positive => "POS",
            SampleCategory::Negative => "NEG",
            SampleCategory::Unclassified => "",
        }
    }

    /// Human label, used in reports where a blank would be ambiguous.
    pub fn label(&self) -> &'static str {
        match self {
            SampleCategory::Unclassified => "UNCLASSIFIED",
            other => other.as_str(),
        }
    }

    pub fn is_labeled(&self) -> bool {
        !matches!(self, SampleCategory::Unclassified)
    }
}

impl fmt::Display for SampleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for SampleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "POS" | "POSITIVE" => Ok(SampleCategory::Positive),
            "NEG" | "NEGATIVE" => Ok(SampleCategory::Negative),
            "" | "UNCLASSIFIED" => Ok(SampleCategory::Unclassified),
            _ => Err(format!("Unknown sample category: {s}")),
        }
    }
}

/// Per-channel data validity (stage 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Validity {
    Valid,
    Invalid,
}

impl Validity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Validity::Valid => "VALID",
            Validity::Invalid => "INVALID",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Validity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VALID" => Ok(Validity::Valid),
            "INVALID" => Ok(Validity::Invalid),
            _ => Err(format!("Unknown validity: {s}")),
        }
    }
}

/// Discordance between a channel call and the expected sample category (stage 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TruthFlag {
    FalsePositive,
    FalseNegative,
}

impl TruthFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TruthFlag::FalsePositive => "False Positive",
            TruthFlag::FalseNegative => "False Negative",
        }
    }

    /// Column value for an optional flag; no flag is blank.
    pub fn cell(flag: Option<TruthFlag>) -> &'static str {
        flag.map_or("", |flag| flag.as_str())
    }

    /// Reads a column value back; blank or unknown text is no flag.
    pub fn from_cell(value: &str) -> Option<TruthFlag> {
        match value.trim() {
            "False Positive" => Some(TruthFlag::FalsePositive),
            "False Negative" => Some(TruthFlag::FalseNegative),
            _ => None,
        }
    }
}

impl fmt::Display for TruthFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-channel PQ threshold outcome (stage 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PqResult {
    Pass,
    Fail,
}

impl PqResult {
    pub fn from_bool(passed: bool) -> Self {
        if passed { PqResult::Pass } else { PqResult::Fail }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PqResult::Pass => "PASS",
            PqResult::Fail => "FAIL",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, PqResult::Pass)
    }
}

impl fmt::Display for PqResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PqResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PASS" => Ok(PqResult::Pass),
            "FAIL" => Ok(PqResult::Fail),
            _ => Err(format!("Unknown PQ result: {s}")),
        }
    }
}

/// Specimen-level verdict (stage 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallResult {
    Pass,
    Fail,
}

impl OverallResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallResult::Pass => "PASS",
            OverallResult::Fail => "FAIL",
        }
    }
}

impl fmt::Display for OverallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
