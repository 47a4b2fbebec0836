//! Property checks for the verdict rules.

use fusion_model::{OverallResult, PqResult, Threshold, TruthFlag, Validity};
use fusion_validate::{overall_verdict, pq_threshold};
use proptest::prelude::*;

fn validity() -> impl Strategy<Value = Validity> {
    prop_oneof![Just(Validity::Valid), Just(Validity::Invalid)]
}

fn truth() -> impl Strategy<Value = Option<TruthFlag>> {
    prop_oneof![
        Just(None),
        Just(Some(TruthFlag::FalsePositive)),
        Just(Some(TruthFlag::FalseNegative)),
    ]
}

fn pq() -> impl Strategy<Value = PqResult> {
    prop_oneof![Just(PqResult::Pass), Just(PqResult::Fail)]
}

proptest! {
    #[test]
    fn invalid_channel_always_fails(
        validity in prop::collection::vec(validity(), 1..5),
        truths in prop::collection::vec(truth(), 0..5),
        pq in prop::collection::vec(pq(), 0..6),
    ) {
        let verdict = overall_verdict(&validity, &truths, &pq);
        if validity.contains(&Validity::Invalid) {
            prop_assert_eq!(verdict, OverallResult::Fail);
        }
        let clean = validity.iter().all(|v| v.is_valid())
            && truths.iter().all(Option::is_none)
            && pq.iter().all(|p| p.is_pass());
        prop_assert_eq!(verdict == OverallResult::Pass, clean);
    }

    #[test]
    fn dash_matches_zero(min in prop::option::of(-10.0f64..10.0), max in prop::option::of(-10.0f64..10.0)) {
        let threshold = Threshold { min, max };
        prop_assert_eq!(pq_threshold(threshold, "-"), pq_threshold(threshold, "0"));
    }

    #[test]
    fn unbounded_threshold_passes_any_text(text in ".*") {
        prop_assert_eq!(pq_threshold(Threshold::NONE, &text), PqResult::Pass);
    }
}
