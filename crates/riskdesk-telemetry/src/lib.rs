//! riskdesk Telemetry
//!
//! Observability for the classification service.
//!
//! Provides:
//! - The per-classification event payload
//! - Event sinks (structured logs, in-memory capture, fan-out)
//! - In-process outcome counters backing the stats endpoint and eval reports

pub mod event;
pub mod metrics;
pub mod sink;

pub use event::{ClassificationEvent, FallbackReason, ServedBy};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use sink::{EventSink, FanoutSink, MemorySink, TracingSink};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::event::{ClassificationEvent, FallbackReason, ServedBy};
    pub use crate::metrics::MetricsCollector;
    pub use crate::sink::{EventSink, MemorySink, TracingSink};
}
