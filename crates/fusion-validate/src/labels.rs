//! Barcode labeling (stage 1).

use fusion_model::{LabelRules, Result, SampleCategory, compile_pattern};
use regex::Regex;

/// Compiled form of a profile's [`LabelRules`].
///
/// Label sets match as case-insensitive substrings; patterns are searched
/// case-insensitively anywhere in the barcode. Positive rules win over
/// negative rules when both match.
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    positive: Vec<String>,
    negative: Vec<String>,
    positive_pattern: Option<Regex>,
    negative_pattern: Option<Regex>,
    control_patterns: Vec<Regex>,
}

impl LabelMatcher {
    pub fn new(rules: &LabelRules) -> Result<Self> {
        let lowered = |labels: &[String]| -> Vec<String> {
            labels
                .iter()
                .map(|label| label.trim().to_lowercase())
                .filter(|label| !label.is_empty())
                .collect()
        };
        let positive_pattern = rules
            .positive_pattern
            .as_deref()
            .map(|pattern| compile_pattern("labels.positive_pattern", pattern))
            .transpose()?;
        let negative_pattern = rules
            .negative_pattern
            .as_deref()
            .map(|pattern| compile_pattern("labels.negative_pattern", pattern))
            .transpose()?;
        let control_patterns = rules
            .control_patterns
            .iter()
            .map(|pattern| compile_pattern("labels.control_patterns", pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            positive: lowered(&rules.positive),
            negative: lowered(&rules.negative),
            positive_pattern,
            negative_pattern,
            control_patterns,
        })
    }

    /// Resolves every barcode to exactly one category.
    pub fn classify(&self, barcode: &str) -> SampleCategory {
        let lower = barcode.to_lowercase();
        if contains_any(&lower, &self.positive) || matches(self.positive_pattern.as_ref(), barcode)
        {
            SampleCategory::Positive
        } else if contains_any(&lower, &self.negative)
            || matches(self.negative_pattern.as_ref(), barcode)
        {
            SampleCategory::Negative
        } else {
            SampleCategory::Unclassified
        }
    }

    /// True for lab controls of other assays, which never count as specimens.
    pub fn is_control(&self, barcode: &str) -> bool {
        self.control_patterns
            .iter()
            .any(|pattern| pattern.is_match(barcode))
    }
}

fn contains_any(lower: &str, labels: &[String]) -> bool {
    labels.iter().any(|label| lower.contains(label.as_str()))
}

fn matches(pattern: Option<&Regex>, barcode: &str) -> bool {
    pattern.is_some_and(|pattern| pattern.is_match(barcode))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> LabelRules {
        LabelRules {
            positive: vec!["PANEL".to_string()],
            negative: vec!["NEG".to_string(), "UWH".to_string()],
            positive_pattern: Some("^103101".to_string()),
            negative_pattern: Some("^101111".to_string()),
            control_patterns: vec!["^101101".to_string()],
        }
    }

    #[test]
    fn test_classify_by_label() {
        let matcher = LabelMatcher::new(&rules()).unwrap();
        assert_eq!(matcher.classify("PARA PANEL C_007"), SampleCategory::Positive);
        assert_eq!(matcher.classify("para panel c_008"), SampleCategory::Positive);
        assert_eq!(matcher.classify("UWH-211"), SampleCategory::Negative);
        assert_eq!(matcher.classify("neg ctrl 4"), SampleCategory::Negative);
        assert_eq!(matcher.classify("0012345"), SampleCategory::Unclassified);
    }

    #[test]
    fn test_classify_by_pattern() {
        let matcher = LabelMatcher::new(&rules()).unwrap();
        assert_eq!(matcher.classify("1031019988"), SampleCategory::Positive);
        assert_eq!(matcher.classify("1011113418731122501243"), SampleCategory::Negative);
        assert_eq!(matcher.classify("9103101"), SampleCategory::Unclassified);
    }

    #[test]
    fn test_positive_wins_over_negative() {
        let matcher = LabelMatcher::new(&rules()).unwrap();
        assert_eq!(matcher.classify("NEG PANEL"), SampleCategory::Positive);
    }

    #[test]
    fn test_control_patterns() {
        let matcher = LabelMatcher::new(&rules()).unwrap();
        assert!(matcher.is_control("1011014455"));
        assert!(!matcher.is_control("PARA PANEL C_007"));
        assert!(!matcher.is_control("0012345"));
    }

    #[test]
    fn test_bad_pattern_is_rejected() {
        let mut rules = rules();
        rules.negative_pattern = Some("(".to_string());
        assert!(LabelMatcher::new(&rules).is_err());
    }
}
