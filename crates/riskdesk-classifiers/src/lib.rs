//! riskdesk Classifiers
//!
//! Deterministic risk classification for banking support questions.
//!
//! A question is normalized, scanned once against the signal lexicon, and
//! turned into a decision bundle that has already passed the schema gate.
//! The classifier performs no I/O and is safe to share across tasks.

pub mod deterministic;
pub mod lexicon;
pub mod templates;
pub mod topic;

pub use deterministic::{DeterministicClassifier, ROUTINE_RISK};
pub use lexicon::{SignalEntry, SignalKind, SignalLexicon, SignalMatch};
pub use topic::{normalize, InquiryTopic, TopicDetector};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::deterministic::DeterministicClassifier;
    pub use crate::lexicon::{SignalEntry, SignalKind, SignalLexicon};
}
