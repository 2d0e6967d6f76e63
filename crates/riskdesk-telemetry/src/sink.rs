//! Event sinks

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use crate::event::ClassificationEvent;

/// Receiver of classification events.
///
/// Called inline on the request path, so implementations must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ClassificationEvent);
}

/// Writes each event as one structured log line
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ClassificationEvent) {
        info!(
            target: "riskdesk::decisions",
            request_id = %event.request_id,
            customer_id = %event.customer_id,
            risk = event.risk,
            category = %event.risk_category,
            block_card = event.block_card,
            served_by = %event.served_by,
            fallback_served = event.fallback_served,
            fallback_reason = event.fallback_reason.map(|r| r.label()),
            signals = ?event.risk_signals,
            attempts = event.attempts,
            context_degraded = event.context_degraded,
            latency_us = event.latency_us,
            "Classification completed"
        );
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ClassificationEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events received so far
    pub fn events(&self) -> Vec<ClassificationEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &ClassificationEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Forwards every event to each inner sink, in order
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &ClassificationEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::tests::bundle;
    use crate::event::ServedBy;
    use riskdesk_core::CustomerId;
    use uuid::Uuid;

    fn event() -> ClassificationEvent {
        ClassificationEvent::new(
            Uuid::new_v4(),
            CustomerId(123),
            &bundle(9, "critical", true),
            ServedBy::Deterministic,
        )
    }

    #[test]
    fn test_memory_sink_records_events() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.emit(&event());
        sink.emit(&event());
        assert_eq!(sink.len(), 2);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let a = Arc::new(MemorySink::new());
        let b = Arc::new(MemorySink::new());
        let fanout = FanoutSink::new()
            .with(a.clone())
            .with(b.clone())
            .with(Arc::new(TracingSink));

        let event = event();
        fanout.emit(&event);

        assert_eq!(fanout.len(), 3);
        assert_eq!(a.events(), vec![event.clone()]);
        assert_eq!(b.events(), vec![event]);
    }
}
