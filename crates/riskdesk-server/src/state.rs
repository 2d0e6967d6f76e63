//! Shared application state

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use riskdesk_classifiers::DeterministicClassifier;
use riskdesk_orchestrator::{OpenAiBackend, Orchestrator};
use riskdesk_telemetry::{EventSink, FanoutSink, MetricsCollector, TracingSink};
use std::sync::Arc;
use tracing::info;

use crate::config::ServiceConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,

    /// In-process counters backing `/stats`
    pub stats: MetricsCollector,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Initialize application state from configuration
    pub fn new(config: &ServiceConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        let stats = MetricsCollector::new();
        let orchestrator = build_orchestrator(config, Arc::new(stats.clone()))?;

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            stats,
            metrics_handle,
        })
    }
}

/// Wire the orchestrator's collaborators from configuration.
///
/// Events go to the structured log and to `sink`.
pub fn build_orchestrator(config: &ServiceConfig, sink: Arc<dyn EventSink>) -> Result<Orchestrator> {
    let classifier = DeterministicClassifier::from_lexicon_file(config.lexicon_path.as_deref())?;
    info!(
        signals = classifier.lexicon().len(),
        source = %config
            .lexicon_path
            .as_ref()
            .map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
        "Signal lexicon loaded"
    );

    let directory = config.directory.build();
    let events = FanoutSink::new().with(Arc::new(TracingSink)).with(sink);

    let orchestrator = Orchestrator::new(
        config.orchestrator.clone(),
        classifier,
        Arc::new(directory),
        Arc::new(events),
    );

    let orchestrator = match config.resolved_backend() {
        Some(backend) => {
            info!(model = %backend.model, url = %backend.base_url, "Generative backend configured");
            orchestrator.with_backend(Arc::new(OpenAiBackend::new(backend.clone())?))
        }
        None => orchestrator,
    };

    info!(mode = %orchestrator.mode(), "Orchestrator ready");
    Ok(orchestrator)
}

/// Register help text for every metric the service emits
pub fn describe_metrics() {
    metrics::describe_counter!(
        "riskdesk_requests_total",
        "Total number of support requests received"
    );
    metrics::describe_counter!(
        "riskdesk_decisions_total",
        "Decisions returned, by risk category and serving path"
    );
    metrics::describe_counter!(
        "riskdesk_fallbacks_total",
        "Requests answered by the deterministic fallback, by reason"
    );
    metrics::describe_counter!(
        "riskdesk_rejected_requests_total",
        "Requests rejected as invalid before classification"
    );
    metrics::describe_counter!(
        "riskdesk_context_failures_total",
        "Customer context lookups that failed or timed out"
    );
    metrics::describe_counter!("riskdesk_blocks_total", "Decisions that blocked the card");
    metrics::describe_counter!(
        "riskdesk_generative_failures_total",
        "Failed generative attempts, by reason"
    );
    metrics::describe_histogram!(
        "riskdesk_classification_latency_us",
        metrics::Unit::Microseconds,
        "End-to-end classification latency in microseconds"
    );
}
