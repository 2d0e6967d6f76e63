//! riskdesk Core
//!
//! Core types and invariants shared across riskdesk components.
//!
//! This crate provides:
//! - The decision bundle returned for every classified support request
//! - The fixed risk partition (routine / concerning / urgent / critical)
//! - The request and customer-context shapes
//! - The schema validator every decision passes through before it is returned
//! - Error types and result handling

pub mod error;
pub mod schema;
pub mod types;

pub use error::{Error, Result};
pub use schema::{validate, validate_json, CandidateBundle, DecisionSource, SchemaViolation};
pub use types::{
    CustomerContext, CustomerId, DecisionBundle, Money, RiskCategory, RiskScore, SupportRequest,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::schema::{CandidateBundle, DecisionSource, SchemaViolation};
    pub use crate::types::{
        CustomerContext, CustomerId, DecisionBundle, Money, RiskCategory, RiskScore,
        SupportRequest,
    };
}
