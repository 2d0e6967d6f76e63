//! Property tests for the risk partition and the schema gate

use proptest::prelude::*;
use riskdesk_core::{
    validate, CandidateBundle, DecisionSource, Error, RiskCategory, RiskScore, SchemaViolation,
};

fn candidate(risk: i64, category: &str) -> CandidateBundle {
    CandidateBundle {
        support_advice: "Hello Sam, here is what to do next.".to_string(),
        block_card: false,
        risk,
        risk_explanation: "The question matched a known pattern.".to_string(),
        risk_category: category.to_string(),
        risk_signals: Vec::new(),
    }
}

proptest! {
    #[test]
    fn every_in_range_score_has_exactly_one_category(risk in 0i64..=10) {
        let score = RiskScore::new(risk).unwrap();
        let owners: Vec<_> = RiskCategory::ALL
            .iter()
            .filter(|c| c.contains(score))
            .collect();
        prop_assert_eq!(owners.len(), 1);
        prop_assert_eq!(*owners[0], RiskCategory::for_score(score));
    }

    #[test]
    fn out_of_range_scores_never_construct(risk in prop_oneof![i64::MIN..0i64, 11i64..i64::MAX]) {
        prop_assert_eq!(RiskScore::new(risk), Err(SchemaViolation::RiskOutOfRange(risk)));
    }

    #[test]
    fn validator_accepts_only_the_partition_category(risk in 0i64..=10, idx in 0usize..4) {
        let claimed = RiskCategory::ALL[idx];
        let expected = RiskCategory::for_score(RiskScore::new(risk).unwrap());
        let result = validate(candidate(risk, claimed.label()), DecisionSource::Generative);

        if claimed == expected {
            let bundle = result.unwrap();
            prop_assert_eq!(bundle.risk_category(), expected);
            prop_assert_eq!(i64::from(bundle.risk().value()), risk);
        } else {
            let is_mismatch = matches!(
                result,
                Err(Error::SchemaViolation {
                    violation: SchemaViolation::CategoryMismatch { .. },
                    ..
                })
            );
            prop_assert!(is_mismatch);
        }
    }
}

#[test]
fn category_bounds_tile_the_score_range() {
    let mut next = 0u8;
    for category in RiskCategory::ALL {
        let (low, high) = category.bounds();
        assert_eq!(low, next, "{} must start where the previous band ended", category);
        assert!(high >= low);
        next = high + 1;
    }
    assert_eq!(next, 11);
}
