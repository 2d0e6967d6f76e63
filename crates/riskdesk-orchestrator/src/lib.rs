//! riskdesk Orchestrator
//!
//! Decides which path classifies a support request and guarantees that a
//! schema-valid decision comes back whatever the generative backend does.
//!
//! Collaborators are passed in explicitly at construction:
//! - [`CustomerContextProvider`] for account facts
//! - [`GenerativeBackend`] for generative mode (absent in deterministic mode)
//! - an [`EventSink`](riskdesk_telemetry::EventSink) for classification events

pub mod backend;
pub mod context;
pub mod instructions;
pub mod orchestrator;

pub use backend::{GenerationPrompt, GenerativeBackend, OpenAiBackend, OpenAiConfig};
pub use context::{Account, CustomerContextProvider, InMemoryDirectory};
pub use orchestrator::{ClassificationOutcome, Mode, Orchestrator, OrchestratorConfig};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::backend::GenerativeBackend;
    pub use crate::context::CustomerContextProvider;
    pub use crate::orchestrator::{ClassificationOutcome, Mode, Orchestrator, OrchestratorConfig};
}
