//! Decision schema and the validation gate
//!
//! Every decision, whether it was built by the deterministic classifier or
//! returned by a generative backend, enters as an untrusted [`CandidateBundle`]
//! and leaves [`validate`] either as a [`DecisionBundle`] or as a typed
//! [`SchemaViolation`]. Checks run in a fixed order and stop at the first
//! failure:
//!
//! 1. shape of every field
//! 2. `0 <= risk <= 10`
//! 3. category agrees with the risk partition
//! 4. explanation is non-empty and a single sentence
//! 5. advice is non-empty

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::types::{DecisionBundle, RiskCategory, RiskScore};

/// Which path produced a candidate decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    /// Built by the lexicon-driven classifier
    Deterministic,
    /// Returned by a generative backend
    Generative,
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deterministic => f.write_str("deterministic"),
            Self::Generative => f.write_str("generative"),
        }
    }
}

/// A single broken invariant of the decision contract
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("payload does not match the decision shape: {0}")]
    Shape(String),

    #[error("risk {0} is outside the inclusive range 0-10")]
    RiskOutOfRange(i64),

    #[error("unknown risk category {0:?}")]
    UnknownCategory(String),

    #[error("risk {risk} belongs to category {expected}, not {actual}")]
    CategoryMismatch {
        risk: u8,
        expected: RiskCategory,
        actual: RiskCategory,
    },

    #[error("risk explanation is empty")]
    EmptyExplanation,

    #[error("risk explanation must be exactly one sentence")]
    MultiSentenceExplanation,

    #[error("support advice is empty")]
    EmptyAdvice,
}

impl SchemaViolation {
    /// Stable identifier, used as a metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Shape(_) => "shape",
            Self::RiskOutOfRange(_) => "risk_out_of_range",
            Self::UnknownCategory(_) => "unknown_category",
            Self::CategoryMismatch { .. } => "category_mismatch",
            Self::EmptyExplanation => "empty_explanation",
            Self::MultiSentenceExplanation => "multi_sentence_explanation",
            Self::EmptyAdvice => "empty_advice",
        }
    }
}

/// Untrusted decision-shaped payload.
///
/// Accepts the snake_case wire names as well as camelCase spellings, since
/// generative backends are not consistent about key casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateBundle {
    #[serde(alias = "advice", alias = "supportAdvice")]
    pub support_advice: String,

    #[serde(alias = "blockCard")]
    pub block_card: bool,

    pub risk: i64,

    #[serde(alias = "riskExplanation")]
    pub risk_explanation: String,

    #[serde(alias = "riskCategory")]
    pub risk_category: String,

    #[serde(default, alias = "riskSignals")]
    pub risk_signals: Vec<String>,
}

impl CandidateBundle {
    /// Parse raw backend output. A surrounding markdown code fence is tolerated.
    pub fn from_json(raw: &str) -> std::result::Result<Self, SchemaViolation> {
        serde_json::from_str(strip_code_fence(raw))
            .map_err(|e| SchemaViolation::Shape(e.to_string()))
    }
}

/// Run the gate on a candidate produced by `source`.
pub fn validate(candidate: CandidateBundle, source: DecisionSource) -> Result<DecisionBundle> {
    check(candidate).map_err(|violation| Error::schema(source, violation))
}

/// Parse and validate raw backend text in one step
pub fn validate_json(raw: &str, source: DecisionSource) -> Result<DecisionBundle> {
    let candidate = CandidateBundle::from_json(raw).map_err(|v| Error::schema(source, v))?;
    validate(candidate, source)
}

fn check(candidate: CandidateBundle) -> std::result::Result<DecisionBundle, SchemaViolation> {
    let CandidateBundle {
        support_advice,
        block_card,
        risk,
        risk_explanation,
        risk_category,
        risk_signals,
    } = candidate;

    let mut signals = Vec::with_capacity(risk_signals.len());
    for signal in risk_signals {
        let signal = signal.trim();
        if signal.is_empty() {
            return Err(SchemaViolation::Shape(
                "risk_signals contains a blank entry".to_string(),
            ));
        }
        signals.push(signal.to_string());
    }

    let risk = RiskScore::new(risk)?;

    let actual: RiskCategory = risk_category.parse()?;
    let expected = RiskCategory::for_score(risk);
    if actual != expected {
        return Err(SchemaViolation::CategoryMismatch {
            risk: risk.value(),
            expected,
            actual,
        });
    }

    let explanation = risk_explanation.trim();
    if explanation.is_empty() {
        return Err(SchemaViolation::EmptyExplanation);
    }
    if !is_single_sentence(explanation) {
        return Err(SchemaViolation::MultiSentenceExplanation);
    }

    let advice = support_advice.trim();
    if advice.is_empty() {
        return Err(SchemaViolation::EmptyAdvice);
    }

    Ok(DecisionBundle::from_validated(
        advice.to_string(),
        block_card,
        risk,
        explanation.to_string(),
        actual,
        signals,
    ))
}

/// Heuristic: no run of sentence-terminal punctuation may be followed by
/// whitespace and further content. Decimal points (`$123.45`) pass; an
/// abbreviation followed by a space (`e.g. this`) does not.
pub fn is_single_sentence(text: &str) -> bool {
    let mut chars = text.trim().chars().peekable();

    while let Some(c) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        // closing quotes and brackets belong to the terminated sentence
        while let Some(&next) = chars.peek() {
            if matches!(next, '.' | '!' | '?' | '"' | '\'' | ')' | ']') {
                chars.next();
            } else {
                break;
            }
        }

        if chars.peek().is_some_and(|c| c.is_whitespace()) {
            return !chars.any(|c| !c.is_whitespace());
        }
    }

    true
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // drop the info string ("json") on the opening fence line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> CandidateBundle {
        CandidateBundle {
            support_advice: "Hello John, we have blocked your card.".to_string(),
            block_card: true,
            risk: 9,
            risk_explanation: "The customer reported a lost card.".to_string(),
            risk_category: "critical".to_string(),
            risk_signals: vec!["lost".to_string()],
        }
    }

    fn violation(candidate: CandidateBundle) -> SchemaViolation {
        match validate(candidate, DecisionSource::Generative) {
            Err(Error::SchemaViolation { violation, .. }) => violation,
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_candidate_passes() {
        let bundle = validate(candidate(), DecisionSource::Generative).unwrap();
        assert_eq!(bundle.risk().value(), 9);
        assert_eq!(bundle.risk_category(), RiskCategory::Critical);
        assert!(bundle.block_card());
        assert_eq!(bundle.risk_signals(), ["lost".to_string()]);
    }

    #[test]
    fn test_risk_out_of_range() {
        let mut c = candidate();
        c.risk = 11;
        assert_eq!(violation(c), SchemaViolation::RiskOutOfRange(11));

        let mut c = candidate();
        c.risk = -3;
        assert_eq!(violation(c), SchemaViolation::RiskOutOfRange(-3));
    }

    #[test]
    fn test_category_mismatch() {
        let mut c = candidate();
        c.risk_category = "urgent".to_string();
        assert_eq!(
            violation(c),
            SchemaViolation::CategoryMismatch {
                risk: 9,
                expected: RiskCategory::Critical,
                actual: RiskCategory::Urgent,
            }
        );
    }

    #[test]
    fn test_unknown_category() {
        let mut c = candidate();
        c.risk_category = "high".to_string();
        assert!(matches!(violation(c), SchemaViolation::UnknownCategory(_)));
    }

    #[test]
    fn test_explanation_checks() {
        let mut c = candidate();
        c.risk_explanation = "  ".to_string();
        assert_eq!(violation(c), SchemaViolation::EmptyExplanation);

        let mut c = candidate();
        c.risk_explanation = "The card was lost. Fraud is likely.".to_string();
        assert_eq!(violation(c), SchemaViolation::MultiSentenceExplanation);
    }

    #[test]
    fn test_empty_advice() {
        let mut c = candidate();
        c.support_advice = String::new();
        assert_eq!(violation(c), SchemaViolation::EmptyAdvice);
    }

    #[test]
    fn test_checks_run_in_order() {
        // out-of-range risk is reported before the empty advice
        let mut c = candidate();
        c.risk = 15;
        c.support_advice = String::new();
        assert_eq!(violation(c), SchemaViolation::RiskOutOfRange(15));
    }

    #[test]
    fn test_blank_signal_is_shape_violation() {
        let mut c = candidate();
        c.risk_signals.push(" ".to_string());
        assert!(matches!(violation(c), SchemaViolation::Shape(_)));
    }

    #[test]
    fn test_single_sentence_heuristic() {
        assert!(is_single_sentence("Your balance is $123.45 today."));
        assert!(is_single_sentence("The customer reported theft!"));
        assert!(is_single_sentence("No terminal punctuation at all"));
        assert!(is_single_sentence("They said \"stop.\""));
        assert!(!is_single_sentence("First. Second."));
        assert!(!is_single_sentence("Is it lost? Probably."));
    }

    #[test]
    fn test_json_shape_and_aliases() {
        let raw = r#"{
            "advice": "Hi Ann, your balance is $100.00.",
            "blockCard": false,
            "risk": 1,
            "riskExplanation": "This is a routine balance inquiry.",
            "riskCategory": "routine"
        }"#;
        let bundle = validate_json(raw, DecisionSource::Generative).unwrap();
        assert!(!bundle.block_card());
        assert!(bundle.risk_signals().is_empty());
    }

    #[test]
    fn test_json_in_code_fence() {
        let raw = "```json\n{\"support_advice\": \"Hi.\", \"block_card\": false, \"risk\": 0, \
                   \"risk_explanation\": \"Routine.\", \"risk_category\": \"routine\"}\n```";
        assert!(validate_json(raw, DecisionSource::Generative).is_ok());
    }

    #[test]
    fn test_malformed_json_is_shape_violation() {
        let err = validate_json("Sure! Here is my answer", DecisionSource::Generative).unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaViolation {
                origin: DecisionSource::Generative,
                violation: SchemaViolation::Shape(_),
            }
        ));

        // risk as a string is a shape error, not a range error
        let raw = r#"{"support_advice": "x", "block_card": false, "risk": "3",
                      "risk_explanation": "x", "risk_category": "concerning"}"#;
        let err = validate_json(raw, DecisionSource::Generative).unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaViolation {
                violation: SchemaViolation::Shape(_),
                ..
            }
        ));
    }

    #[test]
    fn test_serialized_bundle_uses_wire_names() {
        let bundle = validate(candidate(), DecisionSource::Deterministic).unwrap();
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["support_advice"], "Hello John, we have blocked your card.");
        assert_eq!(json["block_card"], true);
        assert_eq!(json["risk"], 9);
        assert_eq!(json["risk_category"], "critical");
        assert_eq!(json["risk_signals"][0], "lost");
    }
}
