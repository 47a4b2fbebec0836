use fusion_model::{ComparisonMode, Threshold};
use proptest::prelude::*;

fn bound() -> impl Strategy<Value = f64> {
    -5000.0f64..5000.0
}

proptest! {
    #[test]
    fn unbounded_always_passes(value in proptest::num::f64::ANY) {
        prop_assert!(Threshold::NONE.passes(value));
    }

    #[test]
    fn min_only_passes_iff_above(min in bound(), value in bound()) {
        let threshold = Threshold { min: Some(min), max: None };
        prop_assert_eq!(threshold.mode(), Some(ComparisonMode::GreaterThanMin));
        prop_assert_eq!(threshold.passes(value), value > min);
    }

    #[test]
    fn max_only_passes_iff_below(max in bound(), value in bound()) {
        let threshold = Threshold { min: None, max: Some(max) };
        prop_assert_eq!(threshold.mode(), Some(ComparisonMode::LessThanMax));
        prop_assert_eq!(threshold.passes(value), value < max);
    }

    #[test]
    fn both_pass_iff_strictly_between(a in bound(), b in bound(), value in bound()) {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let threshold = Threshold { min: Some(min), max: Some(max) };
        prop_assert_eq!(threshold.mode(), Some(ComparisonMode::Between));
        prop_assert_eq!(threshold.passes(value), min < value && value < max);
    }
}
