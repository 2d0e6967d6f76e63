//! Classification event payload
//!
//! One event is produced per completed classification. The core builds the
//! payload; where it goes is up to the [`EventSink`](crate::sink::EventSink).

use chrono::{DateTime, Utc};
use riskdesk_core::{CustomerId, DecisionBundle, RiskCategory};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Which path produced the returned decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServedBy {
    /// Deterministic mode
    Deterministic,
    /// Generative mode, validated backend output
    Generative,
    /// Generative mode, deterministic classifier after the backend failed
    Fallback,
}

impl ServedBy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deterministic => "deterministic",
            Self::Generative => "generative",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ServedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why the generative path gave up, taken from the last failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    SchemaViolation,
    Timeout,
    BackendUnavailable,
}

impl FallbackReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SchemaViolation => "schema_violation",
            Self::Timeout => "timeout",
            Self::BackendUnavailable => "backend_unavailable",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured record of one completed classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationEvent {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub customer_id: CustomerId,
    pub risk: u8,
    pub risk_category: RiskCategory,
    pub block_card: bool,
    pub served_by: ServedBy,

    /// Deterministic answer served after the generative path failed
    pub fallback_served: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,

    pub risk_signals: Vec<String>,

    /// Generative attempts made (0 in deterministic mode)
    pub attempts: u32,

    /// Customer context was unavailable for this request
    pub context_degraded: bool,

    pub latency_us: u64,
}

impl ClassificationEvent {
    pub fn new(
        request_id: Uuid,
        customer_id: CustomerId,
        bundle: &DecisionBundle,
        served_by: ServedBy,
    ) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            customer_id,
            risk: bundle.risk().value(),
            risk_category: bundle.risk_category(),
            block_card: bundle.block_card(),
            served_by,
            fallback_served: served_by == ServedBy::Fallback,
            fallback_reason: None,
            risk_signals: bundle.risk_signals().to_vec(),
            attempts: 0,
            context_degraded: false,
            latency_us: 0,
        }
    }

    pub fn with_fallback_reason(mut self, reason: Option<FallbackReason>) -> Self {
        self.fallback_reason = reason;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_context_degraded(mut self, degraded: bool) -> Self {
        self.context_degraded = degraded;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency_us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use riskdesk_core::{validate, CandidateBundle, DecisionSource};

    pub(crate) fn bundle(risk: i64, category: &str, block_card: bool) -> DecisionBundle {
        validate(
            CandidateBundle {
                support_advice: "Hello John, we are on it.".to_string(),
                block_card,
                risk,
                risk_explanation: "The customer reported a lost card.".to_string(),
                risk_category: category.to_string(),
                risk_signals: vec!["lost".to_string()],
            },
            DecisionSource::Deterministic,
        )
        .unwrap()
    }

    #[test]
    fn test_event_from_bundle() {
        let event = ClassificationEvent::new(
            Uuid::new_v4(),
            CustomerId(7),
            &bundle(9, "critical", true),
            ServedBy::Fallback,
        )
        .with_fallback_reason(Some(FallbackReason::Timeout))
        .with_attempts(2)
        .with_latency(Duration::from_millis(3));

        assert_eq!(event.risk, 9);
        assert_eq!(event.risk_category, RiskCategory::Critical);
        assert!(event.fallback_served);
        assert_eq!(event.latency_us, 3000);
        assert_eq!(event.risk_signals, vec!["lost".to_string()]);
    }

    #[test]
    fn test_event_serialization() {
        let event = ClassificationEvent::new(
            Uuid::new_v4(),
            CustomerId(123),
            &bundle(1, "routine", false),
            ServedBy::Deterministic,
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["served_by"], "deterministic");
        assert_eq!(json["risk_category"], "routine");
        assert_eq!(json["customer_id"], 123);
        assert!(json.get("fallback_reason").is_none());

        let back: ClassificationEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
