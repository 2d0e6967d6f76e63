//! Deterministic classifier
//!
//! Maps a support question to a [`DecisionBundle`] using only the signal
//! lexicon. Pure: the same question, name, and context always produce the
//! same bundle, and no I/O happens here.
//!
//! - no signals: risk 1, routine, card stays active, advice chosen by topic
//! - signals: risk is the highest matched weight, the category follows the
//!   partition, and the card is blocked if any matched signal implies it

use riskdesk_core::{
    validate, CandidateBundle, CustomerContext, DecisionBundle, DecisionSource, Result,
    RiskCategory, RiskScore, SupportRequest,
};
use std::path::Path;
use tracing::{debug, error};

use crate::lexicon::{dominant, SignalLexicon};
use crate::templates;
use crate::topic::{normalize, TopicDetector};

/// Score assigned to questions with no risk signals
pub const ROUTINE_RISK: u8 = 1;

#[derive(Debug, Clone)]
pub struct DeterministicClassifier {
    lexicon: SignalLexicon,
    topics: TopicDetector,
}

impl DeterministicClassifier {
    pub fn new(lexicon: SignalLexicon) -> Result<Self> {
        Ok(Self {
            lexicon,
            topics: TopicDetector::new()?,
        })
    }

    /// Classifier backed by the built-in lexicon
    pub fn builtin() -> Result<Self> {
        Self::new(SignalLexicon::builtin()?)
    }

    /// Classifier backed by a lexicon file, or the built-in one when `path` is `None`
    pub fn from_lexicon_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::new(SignalLexicon::from_file(path)?),
            None => Self::builtin(),
        }
    }

    pub fn lexicon(&self) -> &SignalLexicon {
        &self.lexicon
    }

    /// Classify a request.
    ///
    /// Fails with `InvalidRequest` for an empty question or customer name. A
    /// schema violation here is a defect in the lexicon or templates and is
    /// returned as a fatal error rather than repaired.
    pub fn classify(
        &self,
        request: &SupportRequest,
        context: Option<&CustomerContext>,
    ) -> Result<DecisionBundle> {
        request.validate()?;

        let candidate = self.candidate(request, context);
        validate(candidate, DecisionSource::Deterministic).map_err(|e| {
            error!(error = %e, "Deterministic classifier produced an invalid decision");
            e
        })
    }

    fn candidate(
        &self,
        request: &SupportRequest,
        context: Option<&CustomerContext>,
    ) -> CandidateBundle {
        let text = normalize(&request.question);
        let name = request.customer_name.trim();
        let matches = self.lexicon.scan(&text);

        let Some(top) = dominant(&matches) else {
            let topic = self.topics.detect(&text);
            debug!(?topic, "No risk signals matched");

            return CandidateBundle {
                support_advice: templates::routine_advice(topic, name, context),
                block_card: false,
                risk: i64::from(ROUTINE_RISK),
                risk_explanation: templates::routine_explanation(topic).to_string(),
                risk_category: RiskCategory::Routine.label().to_string(),
                risk_signals: Vec::new(),
            };
        };

        let block_card = matches.iter().any(|m| m.entry.implies_block);
        let risk = top.entry.weight;
        let category = RiskScore::new(i64::from(risk))
            .map(RiskCategory::for_score)
            .map(RiskCategory::label)
            .unwrap_or_default();

        debug!(
            signals = matches.len(),
            dominant = %top.entry.phrase,
            kind = top.entry.kind.label(),
            risk,
            block_card,
            "Risk signals matched"
        );

        CandidateBundle {
            support_advice: templates::signal_advice(top.entry.kind, name, block_card),
            block_card,
            risk: i64::from(risk),
            risk_explanation: templates::signal_explanation(top.entry.kind).to_string(),
            risk_category: category.to_string(),
            risk_signals: matches.iter().map(|m| m.entry.phrase.clone()).collect(),
        }
    }
}
