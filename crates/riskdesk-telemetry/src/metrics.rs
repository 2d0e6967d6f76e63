//! Metrics collection and reporting

use riskdesk_core::RiskCategory;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::event::{ClassificationEvent, ServedBy};
use crate::sink::EventSink;

/// In-process counters for classification outcomes
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    total_requests: AtomicU64,
    rejected_requests: AtomicU64,
    by_category: [AtomicU64; 4],
    blocks: AtomicU64,
    generative_served: AtomicU64,
    fallbacks: AtomicU64,
    context_degraded: AtomicU64,
    total_latency_us: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                total_requests: AtomicU64::new(0),
                rejected_requests: AtomicU64::new(0),
                by_category: Default::default(),
                blocks: AtomicU64::new(0),
                generative_served: AtomicU64::new(0),
                fallbacks: AtomicU64::new(0),
                context_degraded: AtomicU64::new(0),
                total_latency_us: AtomicU64::new(0),
            }),
        }
    }

    /// Record a completed classification
    pub fn record(&self, event: &ClassificationEvent) {
        let inner = &self.inner;
        inner.total_requests.fetch_add(1, Ordering::Relaxed);
        inner.by_category[category_index(event.risk_category)].fetch_add(1, Ordering::Relaxed);

        if event.block_card {
            inner.blocks.fetch_add(1, Ordering::Relaxed);
        }
        match event.served_by {
            ServedBy::Generative => {
                inner.generative_served.fetch_add(1, Ordering::Relaxed);
            }
            ServedBy::Fallback => {
                inner.fallbacks.fetch_add(1, Ordering::Relaxed);
            }
            ServedBy::Deterministic => {}
        }
        if event.context_degraded {
            inner.context_degraded.fetch_add(1, Ordering::Relaxed);
        }
        inner
            .total_latency_us
            .fetch_add(event.latency_us, Ordering::Relaxed);
    }

    /// Record a request rejected before classification
    pub fn record_rejected(&self) {
        self.inner.rejected_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = &self.inner;
        let category = |c: RiskCategory| inner.by_category[category_index(c)].load(Ordering::Relaxed);

        MetricsSnapshot {
            total_requests: inner.total_requests.load(Ordering::Relaxed),
            rejected_requests: inner.rejected_requests.load(Ordering::Relaxed),
            routine: category(RiskCategory::Routine),
            concerning: category(RiskCategory::Concerning),
            urgent: category(RiskCategory::Urgent),
            critical: category(RiskCategory::Critical),
            blocks: inner.blocks.load(Ordering::Relaxed),
            generative_served: inner.generative_served.load(Ordering::Relaxed),
            fallbacks: inner.fallbacks.load(Ordering::Relaxed),
            context_degraded: inner.context_degraded.load(Ordering::Relaxed),
            total_latency_us: inner.total_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for MetricsCollector {
    fn emit(&self, event: &ClassificationEvent) {
        self.record(event);
    }
}

fn category_index(category: RiskCategory) -> usize {
    match category {
        RiskCategory::Routine => 0,
        RiskCategory::Concerning => 1,
        RiskCategory::Urgent => 2,
        RiskCategory::Critical => 3,
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub rejected_requests: u64,
    pub routine: u64,
    pub concerning: u64,
    pub urgent: u64,
    pub critical: u64,
    pub blocks: u64,
    pub generative_served: u64,
    pub fallbacks: u64,
    pub context_degraded: u64,
    pub total_latency_us: u64,
}

impl MetricsSnapshot {
    /// Calculate average latency per classified request
    pub fn avg_latency_us(&self) -> u64 {
        if self.total_requests == 0 {
            0
        } else {
            self.total_latency_us / self.total_requests
        }
    }

    /// Share of classified requests that ended with a card block
    pub fn block_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.blocks as f64 / self.total_requests as f64
        }
    }

    /// Share of generative-mode requests answered by the fallback
    pub fn fallback_rate(&self) -> f64 {
        let generative = self.generative_served + self.fallbacks;
        if generative == 0 {
            0.0
        } else {
            self.fallbacks as f64 / generative as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::tests::bundle;
    use crate::event::FallbackReason;
    use riskdesk_core::CustomerId;
    use std::time::Duration;
    use uuid::Uuid;

    #[test]
    fn test_metrics_collection() {
        let metrics = MetricsCollector::new();

        let critical = ClassificationEvent::new(
            Uuid::new_v4(),
            CustomerId(1),
            &bundle(10, "critical", true),
            ServedBy::Fallback,
        )
        .with_fallback_reason(Some(FallbackReason::SchemaViolation))
        .with_latency(Duration::from_micros(4000));

        let routine = ClassificationEvent::new(
            Uuid::new_v4(),
            CustomerId(2),
            &bundle(1, "routine", false),
            ServedBy::Generative,
        )
        .with_context_degraded(true)
        .with_latency(Duration::from_micros(2000));

        metrics.emit(&critical);
        metrics.emit(&routine);
        metrics.record_rejected();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.rejected_requests, 1);
        assert_eq!(snapshot.critical, 1);
        assert_eq!(snapshot.routine, 1);
        assert_eq!(snapshot.blocks, 1);
        assert_eq!(snapshot.fallbacks, 1);
        assert_eq!(snapshot.context_degraded, 1);
        assert_eq!(snapshot.avg_latency_us(), 3000);
        assert!((snapshot.block_rate() - 0.5).abs() < f64::EPSILON);
        assert!((snapshot.fallback_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = MetricsCollector::new();
        let clone = metrics.clone();
        clone.record_rejected();
        assert_eq!(metrics.snapshot().rejected_requests, 1);
    }

    #[test]
    fn test_empty_snapshot_rates() {
        let snapshot = MetricsCollector::new().snapshot();
        assert_eq!(snapshot.avg_latency_us(), 0);
        assert_eq!(snapshot.block_rate(), 0.0);
        assert_eq!(snapshot.fallback_rate(), 0.0);
    }
}
