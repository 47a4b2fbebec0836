//! Per-channel rules, as pure functions of a specimen's fields.

use fusion_common::parse_f64;
use fusion_model::{
    CallResult, IcStatus, OverallResult, PqResult, SampleCategory, Threshold, TruthFlag, Validity,
};
use fusion_transform::NO_SIGNAL;

/// Stage 2: a call that contradicts the expected category.
///
/// Unlabeled specimens never carry a flag.
pub fn truth_flag(category: SampleCategory, call: CallResult) -> Option<TruthFlag> {
    match (category, call) {
        (SampleCategory::Positive, CallResult::Negative) => Some(TruthFlag::FalseNegative),
        (SampleCategory::Negative, CallResult::Positive) => Some(TruthFlag::FalsePositive),
        _ => None,
    }
}

/// Stage 3: whether the channel produced usable data.
///
/// A positive call on a positive specimen stands on its own; every other
/// accepted combination needs a valid internal control. Unclassified
/// specimens, invalid calls and missing calls are INVALID.
pub fn channel_validity(category: SampleCategory, call: CallResult, ic: IcStatus) -> Validity {
    let valid = match (category, call) {
        (SampleCategory::Positive, CallResult::Positive) => true,
        (SampleCategory::Positive, CallResult::Negative)
        | (SampleCategory::Negative, CallResult::Negative)
        | (SampleCategory::Negative, CallResult::Positive) => ic.is_valid(),
        _ => false,
    };
    if valid {
        Validity::Valid
    } else {
        Validity::Invalid
    }
}

/// Numeric RFU for threshold comparison; the no-signal dash reads as zero.
pub fn pq_value(rfu: &str) -> Option<f64> {
    if rfu.trim() == NO_SIGNAL {
        Some(0.0)
    } else {
        parse_f64(rfu)
    }
}

/// Stage 4: compares a channel's RFU against its threshold pair.
///
/// An unbounded pair passes whatever the value; otherwise a value that is
/// not numeric fails.
pub fn pq_threshold(threshold: Threshold, rfu: &str) -> PqResult {
    if threshold.is_unbounded() {
        return PqResult::Pass;
    }
    PqResult::from_bool(pq_value(rfu).is_some_and(|value| threshold.passes(value)))
}

/// Stage 5: any invalid channel, false call or PQ failure fails the specimen.
pub fn overall_verdict<'a>(
    validity: impl IntoIterator<Item = &'a Validity>,
    truths: impl IntoIterator<Item = &'a Option<TruthFlag>>,
    pq: impl IntoIterator<Item = &'a PqResult>,
) -> OverallResult {
    let failed = validity.into_iter().any(|v| !v.is_valid())
        || truths.into_iter().any(Option::is_some)
        || pq.into_iter().any(|result| !result.is_pass());
    if failed {
        OverallResult::Fail
    } else {
        OverallResult::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POS: SampleCategory = SampleCategory::Positive;
    const NEG: SampleCategory = SampleCategory::Negative;
    const NONE: SampleCategory = SampleCategory::Unclassified;

    #[test]
    fn test_truth_flags() {
        assert_eq!(
            truth_flag(POS, CallResult::Negative),
            Some(TruthFlag::FalseNegative)
        );
        assert_eq!(
            truth_flag(NEG, CallResult::Positive),
            Some(TruthFlag::FalsePositive)
        );
        assert_eq!(truth_flag(POS, CallResult::Positive), None);
        assert_eq!(truth_flag(NEG, CallResult::Invalid), None);
        assert_eq!(truth_flag(NONE, CallResult::Positive), None);
        assert_eq!(truth_flag(NONE, CallResult::Negative), None);
    }

    #[test]
    fn test_validity_table() {
        use CallResult::{Invalid, Negative, NoCall, Positive};
        let cases = [
            (POS, Positive, IcStatus::Valid, Validity::Valid),
            (POS, Positive, IcStatus::Invalid, Validity::Valid),
            (POS, Negative, IcStatus::Valid, Validity::Valid),
            (POS, Negative, IcStatus::Invalid, Validity::Invalid),
            (NEG, Negative, IcStatus::Valid, Validity::Valid),
            (NEG, Positive, IcStatus::Valid, Validity::Valid),
            (NEG, Positive, IcStatus::Invalid, Validity::Invalid),
            (NEG, Negative, IcStatus::Missing, Validity::Invalid),
            (POS, Invalid, IcStatus::Valid, Validity::Invalid),
            (NEG, NoCall, IcStatus::Valid, Validity::Invalid),
            (NONE, Positive, IcStatus::Valid, Validity::Invalid),
            (NONE, Negative, IcStatus::Valid, Validity::Invalid),
        ];
        for (category, call, ic, expected) in cases {
            assert_eq!(
                channel_validity(category, call, ic),
                expected,
                "{category:?} {call:?} {ic:?}"
            );
        }
    }

    #[test]
    fn test_dash_reads_as_zero() {
        let min = Threshold {
            min: Some(1200.0),
            max: None,
        };
        assert_eq!(pq_threshold(min, "-"), PqResult::Fail);
        assert_eq!(pq_threshold(min, "1500"), PqResult::Pass);
        assert_eq!(pq_threshold(min, "1200"), PqResult::Fail);

        let max = Threshold {
            min: None,
            max: Some(1200.0),
        };
        assert_eq!(pq_threshold(max, "-"), PqResult::Pass);
    }

    #[test]
    fn test_non_numeric_rfu() {
        let min = Threshold {
            min: Some(0.0),
            max: None,
        };
        assert_eq!(pq_threshold(min, "N/A"), PqResult::Fail);
        assert_eq!(pq_threshold(min, ""), PqResult::Fail);
        assert_eq!(pq_threshold(Threshold::NONE, "N/A"), PqResult::Pass);
    }

    #[test]
    fn test_overall_verdict() {
        let valid = [Validity::Valid, Validity::Valid];
        let no_flags = [None, None];
        let passes = [PqResult::Pass, PqResult::Pass];
        assert_eq!(
            overall_verdict(&valid, &no_flags, &passes),
            OverallResult::Pass
        );
        assert_eq!(
            overall_verdict(&[Validity::Valid, Validity::Invalid], &no_flags, &passes),
            OverallResult::Fail
        );
        assert_eq!(
            overall_verdict(&valid, &[None, Some(TruthFlag::FalsePositive)], &passes),
            OverallResult::Fail
        );
        assert_eq!(
            overall_verdict(&valid, &no_flags, &[PqResult::Pass, PqResult::Fail]),
            OverallResult::Fail
        );
    }
}
