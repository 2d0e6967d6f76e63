//! Classification orchestrator
//!
//! Entry point for every support request. Validates the request, looks up
//! customer context (degrading to none on failure), and produces a decision
//! by the mode fixed at construction:
//!
//! - **Deterministic**: the lexicon classifier answers directly
//! - **Generative**: the backend answers, bounded by a per-attempt timeout and
//!   an attempt budget; once the budget is spent the deterministic classifier
//!   answers and the outcome is flagged as fallback-served
//!
//! Whatever path answers, the bundle has passed the schema gate. Nothing
//! here spawns tasks or holds locks across an await, so dropping the
//! `classify` future cancels any in-flight backend call.

use riskdesk_classifiers::DeterministicClassifier;
use riskdesk_core::{
    validate_json, CustomerContext, DecisionBundle, DecisionSource, Error, Result, SupportRequest,
};
use riskdesk_telemetry::{ClassificationEvent, EventSink, FallbackReason, ServedBy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{GenerationPrompt, GenerativeBackend};
use crate::context::CustomerContextProvider;
use crate::instructions;

/// Timeouts and retry budget, read once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Upper bound on a single backend call
    #[serde(default = "default_backend_timeout_ms")]
    pub backend_timeout_ms: u64,

    /// Upper bound on the customer context lookup
    #[serde(default = "default_context_timeout_ms")]
    pub context_timeout_ms: u64,

    /// Backend calls per request, first try included
    #[serde(default = "default_max_generative_attempts")]
    pub max_generative_attempts: u32,
}

fn default_backend_timeout_ms() -> u64 {
    10_000
}

fn default_context_timeout_ms() -> u64 {
    500
}

fn default_max_generative_attempts() -> u32 {
    2
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            backend_timeout_ms: default_backend_timeout_ms(),
            context_timeout_ms: default_context_timeout_ms(),
            max_generative_attempts: default_max_generative_attempts(),
        }
    }
}

impl OrchestratorConfig {
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }

    pub fn context_timeout(&self) -> Duration {
        Duration::from_millis(self.context_timeout_ms)
    }

    /// Attempt budget, never less than one
    pub fn attempt_budget(&self) -> u32 {
        self.max_generative_attempts.max(1)
    }
}

/// Classification mode, fixed for the life of an orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Deterministic,
    Generative,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deterministic => f.write_str("deterministic"),
            Self::Generative => f.write_str("generative"),
        }
    }
}

/// Result of one classification, with provenance for observability
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub bundle: DecisionBundle,
    pub served_by: ServedBy,

    /// Backend calls made (0 in deterministic mode)
    pub attempts: u32,

    /// Set only when the deterministic fallback answered
    pub fallback_reason: Option<FallbackReason>,

    /// Customer context was unavailable
    pub context_degraded: bool,

    pub latency: Duration,
    pub request_id: Uuid,
}

impl ClassificationOutcome {
    pub fn fallback_served(&self) -> bool {
        self.served_by == ServedBy::Fallback
    }
}

struct Resolution {
    bundle: DecisionBundle,
    served_by: ServedBy,
    attempts: u32,
    fallback_reason: Option<FallbackReason>,
}

/// Classification orchestrator
pub struct Orchestrator {
    config: OrchestratorConfig,
    classifier: DeterministicClassifier,
    context: Arc<dyn CustomerContextProvider>,
    backend: Option<Arc<dyn GenerativeBackend>>,
    events: Arc<dyn EventSink>,
}

impl Orchestrator {
    /// Deterministic-mode orchestrator
    pub fn new(
        config: OrchestratorConfig,
        classifier: DeterministicClassifier,
        context: Arc<dyn CustomerContextProvider>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            classifier,
            context,
            backend: None,
            events,
        }
    }

    /// Switch to generative mode, backed by `backend`
    pub fn with_backend(mut self, backend: Arc<dyn GenerativeBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn mode(&self) -> Mode {
        if self.backend.is_some() {
            Mode::Generative
        } else {
            Mode::Deterministic
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn classifier(&self) -> &DeterministicClassifier {
        &self.classifier
    }

    /// Classify one support request.
    ///
    /// Errors are limited to `InvalidRequest` and a fatal deterministic
    /// schema violation; backend and context failures never surface here.
    pub async fn classify(&self, request: &SupportRequest) -> Result<ClassificationOutcome> {
        let started = Instant::now();
        let request_id = Uuid::new_v4();

        metrics::counter!("riskdesk_requests_total").increment(1);

        if let Err(e) = request.validate() {
            metrics::counter!("riskdesk_rejected_requests_total").increment(1);
            debug!(%request_id, error = %e, "Rejected support request");
            return Err(e);
        }

        let context = self.lookup_context(request_id, request).await;
        let context_degraded = context.is_none();

        let resolution = match &self.backend {
            None => Resolution {
                bundle: self.classifier.classify(request, context.as_ref())?,
                served_by: ServedBy::Deterministic,
                attempts: 0,
                fallback_reason: None,
            },
            Some(backend) => {
                self.classify_generative(request_id, backend.as_ref(), request, context.as_ref())
                    .await?
            }
        };

        let latency = started.elapsed();
        let outcome = ClassificationOutcome {
            bundle: resolution.bundle,
            served_by: resolution.served_by,
            attempts: resolution.attempts,
            fallback_reason: resolution.fallback_reason,
            context_degraded,
            latency,
            request_id,
        };

        self.record(request, &outcome);
        Ok(outcome)
    }

    async fn lookup_context(
        &self,
        request_id: Uuid,
        request: &SupportRequest,
    ) -> Option<CustomerContext> {
        let lookup = self
            .context
            .lookup(request.customer_id, request.include_pending);

        match timeout(self.config.context_timeout(), lookup).await {
            Ok(Ok(context)) => Some(context),
            Ok(Err(e)) => {
                metrics::counter!("riskdesk_context_failures_total", "reason" => "error").increment(1);
                warn!(
                    %request_id,
                    provider = self.context.name(),
                    customer_id = %request.customer_id,
                    error = %e,
                    "Customer context unavailable, continuing without it"
                );
                None
            }
            Err(_) => {
                metrics::counter!("riskdesk_context_failures_total", "reason" => "timeout").increment(1);
                warn!(
                    %request_id,
                    provider = self.context.name(),
                    customer_id = %request.customer_id,
                    timeout = ?self.config.context_timeout(),
                    "Customer context lookup timed out, continuing without it"
                );
                None
            }
        }
    }

    async fn classify_generative(
        &self,
        request_id: Uuid,
        backend: &dyn GenerativeBackend,
        request: &SupportRequest,
        context: Option<&CustomerContext>,
    ) -> Result<Resolution> {
        let prompt = GenerationPrompt::new(
            instructions::contract(&request.customer_name),
            request,
            context,
        );
        let budget = self.config.attempt_budget();
        let mut last_failure = FallbackReason::BackendUnavailable;

        for attempt in 1..=budget {
            let reason = match timeout(self.config.backend_timeout(), backend.generate(&prompt)).await {
                Ok(Ok(raw)) => match validate_json(&raw, DecisionSource::Generative) {
                    Ok(bundle) => {
                        debug!(%request_id, attempt, backend = backend.name(), "Generative decision accepted");
                        return Ok(Resolution {
                            bundle,
                            served_by: ServedBy::Generative,
                            attempts: attempt,
                            fallback_reason: None,
                        });
                    }
                    Err(e) => {
                        warn!(%request_id, attempt, error = %e, "Generative decision rejected");
                        failure_reason(&e)
                    }
                },
                Ok(Err(e)) => {
                    warn!(%request_id, attempt, backend = backend.name(), error = %e, "Generative backend failed");
                    failure_reason(&e)
                }
                Err(_) => {
                    let e = Error::BackendTimeout(self.config.backend_timeout());
                    warn!(%request_id, attempt, backend = backend.name(), error = %e, "Generative backend timed out");
                    failure_reason(&e)
                }
            };

            metrics::counter!("riskdesk_generative_failures_total", "reason" => reason.label())
                .increment(1);
            last_failure = reason;
        }

        warn!(
            %request_id,
            attempts = budget,
            reason = %last_failure,
            "Generative path exhausted, serving deterministic fallback"
        );

        Ok(Resolution {
            bundle: self.classifier.classify(request, context)?,
            served_by: ServedBy::Fallback,
            attempts: budget,
            fallback_reason: Some(last_failure),
        })
    }

    fn record(&self, request: &SupportRequest, outcome: &ClassificationOutcome) {
        let bundle = &outcome.bundle;

        metrics::counter!(
            "riskdesk_decisions_total",
            "category" => bundle.risk_category().label(),
            "served_by" => outcome.served_by.label()
        )
        .increment(1);
        if bundle.block_card() {
            metrics::counter!("riskdesk_blocks_total").increment(1);
        }
        if let Some(reason) = outcome.fallback_reason {
            metrics::counter!("riskdesk_fallbacks_total", "reason" => reason.label()).increment(1);
        }
        metrics::histogram!("riskdesk_classification_latency_us")
            .record(outcome.latency.as_micros() as f64);

        info!(
            request_id = %outcome.request_id,
            risk = bundle.risk().value(),
            category = %bundle.risk_category(),
            block_card = bundle.block_card(),
            served_by = %outcome.served_by,
            latency_us = outcome.latency.as_micros() as u64,
            "Request classified"
        );

        let event = ClassificationEvent::new(
            outcome.request_id,
            request.customer_id,
            bundle,
            outcome.served_by,
        )
        .with_fallback_reason(outcome.fallback_reason)
        .with_attempts(outcome.attempts)
        .with_context_degraded(outcome.context_degraded)
        .with_latency(outcome.latency);

        self.events.emit(&event);
    }
}

fn failure_reason(error: &Error) -> FallbackReason {
    match error {
        Error::SchemaViolation { .. } => FallbackReason::SchemaViolation,
        Error::BackendTimeout(_) => FallbackReason::Timeout,
        _ => FallbackReason::BackendUnavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskdesk_core::{DecisionSource, SchemaViolation};
    use std::time::Duration;

    #[test]
    fn test_config_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_generative_attempts, 2);
        assert_eq!(config.backend_timeout(), Duration::from_secs(10));
        assert_eq!(config.context_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_attempt_budget_is_at_least_one() {
        let config = OrchestratorConfig {
            max_generative_attempts: 0,
            ..Default::default()
        };
        assert_eq!(config.attempt_budget(), 1);
    }

    #[test]
    fn test_failure_reason_mapping() {
        assert_eq!(
            failure_reason(&Error::schema(DecisionSource::Generative, SchemaViolation::EmptyAdvice)),
            FallbackReason::SchemaViolation
        );
        assert_eq!(
            failure_reason(&Error::BackendTimeout(Duration::from_secs(1))),
            FallbackReason::Timeout
        );
        assert_eq!(
            failure_reason(&Error::backend("connection refused")),
            FallbackReason::BackendUnavailable
        );
    }
}
