//! End-to-end deterministic classification of typical support questions

use riskdesk_classifiers::{DeterministicClassifier, SignalEntry, SignalKind, SignalLexicon};
use riskdesk_core::{CustomerContext, CustomerId, Money, RiskCategory, SupportRequest};
use std::io::Write;

struct Scenario {
    question: &'static str,
    category: RiskCategory,
    block_card: bool,
    signal: Option<&'static str>,
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        question: "I just lost my card!",
        category: RiskCategory::Critical,
        block_card: true,
        signal: Some("lost"),
    },
    Scenario {
        question: "Someone stole my wallet with my credit card! I need help!",
        category: RiskCategory::Critical,
        block_card: true,
        signal: Some("stole"),
    },
    Scenario {
        question: "There are transactions on my account that I didn't make",
        category: RiskCategory::Urgent,
        block_card: true,
        signal: Some("didn't make"),
    },
    Scenario {
        question: "I think someone is using my card fraudulently",
        category: RiskCategory::Critical,
        block_card: true,
        signal: Some("fraud"),
    },
    Scenario {
        question: "What is my current account balance?",
        category: RiskCategory::Routine,
        block_card: false,
        signal: None,
    },
    Scenario {
        question: "Can you show me my recent transactions?",
        category: RiskCategory::Routine,
        block_card: false,
        signal: None,
    },
    Scenario {
        question: "I need to update my contact information",
        category: RiskCategory::Routine,
        block_card: false,
        signal: None,
    },
    Scenario {
        question: "I don't remember making this purchase, but it might be mine",
        category: RiskCategory::Concerning,
        block_card: false,
        signal: Some("don't remember"),
    },
    Scenario {
        question: "I noticed some unusual activity on my account but I'm not sure",
        category: RiskCategory::Concerning,
        block_card: false,
        signal: Some("unusual"),
    },
];

#[test]
fn support_scenarios_classify_as_expected() {
    let classifier = DeterministicClassifier::builtin().unwrap();

    for scenario in SCENARIOS {
        let bundle = classifier
            .classify(&SupportRequest::new(scenario.question, "John"), None)
            .unwrap();

        assert_eq!(bundle.risk_category(), scenario.category, "{}", scenario.question);
        assert_eq!(bundle.block_card(), scenario.block_card, "{}", scenario.question);
        match scenario.signal {
            Some(signal) => assert!(
                bundle.risk_signals().iter().any(|s| s == signal),
                "{}: expected signal {:?} in {:?}",
                scenario.question,
                signal,
                bundle.risk_signals()
            ),
            None => assert!(bundle.risk_signals().is_empty(), "{}", scenario.question),
        }
    }
}

#[test]
fn typographic_apostrophes_match_ascii_phrases() {
    let classifier = DeterministicClassifier::builtin().unwrap();
    let bundle = classifier
        .classify(&SupportRequest::new("I see charges I didn\u{2019}t make", "John"), None)
        .unwrap();
    assert_eq!(bundle.risk_signals(), ["didn't make"]);
}

#[test]
fn reports_typed_without_apostrophes_are_still_flagged() {
    let classifier = DeterministicClassifier::builtin().unwrap();

    let bundle = classifier
        .classify(&SupportRequest::new("I see charges I didnt make", "John"), None)
        .unwrap();
    assert_eq!(bundle.risk_signals(), ["didn't make"]);
    assert_eq!(bundle.risk_category(), RiskCategory::Urgent);
    assert!(bundle.block_card());

    let bundle = classifier
        .classify(&SupportRequest::new("I dont recognize this charge", "John"), None)
        .unwrap();
    assert_eq!(bundle.risk_signals(), ["don't recognize"]);
    assert_eq!(bundle.risk_category(), RiskCategory::Concerning);
    assert!(!bundle.block_card());
}

#[test]
fn low_weight_block_signal_blocks_regardless_of_score() {
    let lexicon = SignalLexicon::new(vec![
        SignalEntry::new("phishing", 7, SignalKind::Scam, false),
        SignalEntry::new("misplaced", 2, SignalKind::CardLoss, true),
    ])
    .unwrap();
    let classifier = DeterministicClassifier::new(lexicon).unwrap();

    // The blocking signal is not the dominant one
    let bundle = classifier
        .classify(&SupportRequest::new("I got a phishing email and I misplaced it", "John"), None)
        .unwrap();
    assert_eq!(bundle.risk().value(), 7);
    assert_eq!(bundle.risk_category(), RiskCategory::Urgent);
    assert!(bundle.block_card());
    assert_eq!(bundle.risk_signals(), ["phishing", "misplaced"]);

    // A routine score still blocks when the signal implies it
    let bundle = classifier
        .classify(&SupportRequest::new("I misplaced it", "John"), None)
        .unwrap();
    assert_eq!(bundle.risk().value(), 2);
    assert_eq!(bundle.risk_category(), RiskCategory::Routine);
    assert!(bundle.block_card());

    let bundle = classifier
        .classify(&SupportRequest::new("Is this phishing?", "John"), None)
        .unwrap();
    assert_eq!(bundle.risk_category(), RiskCategory::Urgent);
    assert!(!bundle.block_card());
}

#[test]
fn balance_advice_reflects_pending_preference() {
    let classifier = DeterministicClassifier::builtin().unwrap();
    let request = SupportRequest::new("How much money do I have?", "Priya").with_include_pending(false);
    let ctx = CustomerContext {
        customer_id: CustomerId(123),
        balance: Money::from_cents(10000),
        includes_pending: false,
        has_pending: true,
    };

    let bundle = classifier.classify(&request, Some(&ctx)).unwrap();
    assert!(bundle.advice().starts_with("Hello Priya,"));
    assert!(bundle.advice().contains("$100.00"));
    assert_eq!(bundle.risk().value(), 1);
}

#[test]
fn lexicon_override_file_replaces_builtin_table() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "signals:\n  - phrase: \"card stuck in atm\"\n    weight: 6\n    kind: card_declined\n"
    )
    .unwrap();

    let classifier = DeterministicClassifier::from_lexicon_file(Some(file.path())).unwrap();
    assert_eq!(classifier.lexicon().len(), 1);

    let bundle = classifier
        .classify(&SupportRequest::new("My card stuck in ATM", "John"), None)
        .unwrap();
    assert_eq!(bundle.risk_category(), RiskCategory::Urgent);
    assert!(!bundle.block_card());
}

#[test]
fn invalid_lexicon_file_is_a_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "signals:\n  - phrase: \"x\"\n    weight: 12\n    kind: fraud\n").unwrap();
    assert!(SignalLexicon::from_file(file.path()).is_err());
}
