//! Core types for riskdesk

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::schema::SchemaViolation;

/// Highest risk score any decision may carry (inclusive)
pub const MAX_RISK: u8 = 10;

/// Customer id assumed when a request omits one
pub const DEFAULT_CUSTOMER_ID: CustomerId = CustomerId(123);

/// A risk score in the closed range `0..=10`.
///
/// There is deliberately no clamping constructor: an out-of-range value is a
/// construction error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RiskScore(u8);

impl RiskScore {
    /// Lowest possible score
    pub const MIN: RiskScore = RiskScore(0);

    /// Highest possible score
    pub const MAX: RiskScore = RiskScore(MAX_RISK);

    /// Create a score, rejecting anything outside `0..=10`
    pub fn new(value: i64) -> std::result::Result<Self, SchemaViolation> {
        if (0..=i64::from(MAX_RISK)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(SchemaViolation::RiskOutOfRange(value))
        }
    }

    /// Raw score value
    pub fn value(self) -> u8 {
        self.0
    }

    /// The category this score falls into under the fixed partition
    pub fn category(self) -> RiskCategory {
        RiskCategory::for_score(self)
    }
}

impl TryFrom<i64> for RiskScore {
    type Error = SchemaViolation;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RiskScore> for u8 {
    fn from(score: RiskScore) -> Self {
        score.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk category, bound to the score by a fixed partition:
/// routine = 0-2, concerning = 3-5, urgent = 6-8, critical = 9-10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Routine,
    Concerning,
    Urgent,
    Critical,
}

impl RiskCategory {
    /// All categories in ascending order of severity
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::Routine,
        RiskCategory::Concerning,
        RiskCategory::Urgent,
        RiskCategory::Critical,
    ];

    /// Derive the category for a score. This is the only place the partition lives.
    pub fn for_score(score: RiskScore) -> Self {
        match score.value() {
            0..=2 => Self::Routine,
            3..=5 => Self::Concerning,
            6..=8 => Self::Urgent,
            _ => Self::Critical,
        }
    }

    /// Inclusive `(low, high)` score bounds of this category
    pub fn bounds(self) -> (u8, u8) {
        match self {
            Self::Routine => (0, 2),
            Self::Concerning => (3, 5),
            Self::Urgent => (6, 8),
            Self::Critical => (9, MAX_RISK),
        }
    }

    /// Whether `score` falls inside this category's bounds
    pub fn contains(self, score: RiskScore) -> bool {
        let (low, high) = self.bounds();
        (low..=high).contains(&score.value())
    }

    /// Wire label
    pub fn label(self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Concerning => "concerning",
            Self::Urgent => "urgent",
            Self::Critical => "critical",
        }
    }

    /// Short description of what belongs in this band
    pub fn description(self) -> &'static str {
        match self {
            Self::Routine => "routine inquiries",
            Self::Concerning => "concerning issues",
            Self::Urgent => "urgent security matters",
            Self::Critical => "critical threats like fraud or theft",
        }
    }
}

impl FromStr for RiskCategory {
    type Err = SchemaViolation;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "routine" => Ok(Self::Routine),
            "concerning" => Ok(Self::Concerning),
            "urgent" => Ok(Self::Urgent),
            "critical" => Ok(Self::Critical),
            _ => Err(SchemaViolation::UnknownCategory(s.to_string())),
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// The structured answer returned for every classified request.
///
/// Fields are private: a bundle can only be obtained from the schema
/// validator, so every instance in circulation satisfies the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionBundle {
    #[serde(rename = "support_advice")]
    advice: String,
    block_card: bool,
    risk: RiskScore,
    risk_explanation: String,
    risk_category: RiskCategory,
    risk_signals: Vec<String>,
}

impl DecisionBundle {
    pub(crate) fn from_validated(
        advice: String,
        block_card: bool,
        risk: RiskScore,
        risk_explanation: String,
        risk_category: RiskCategory,
        risk_signals: Vec<String>,
    ) -> Self {
        Self {
            advice,
            block_card,
            risk,
            risk_explanation,
            risk_category,
            risk_signals,
        }
    }

    /// Customer-facing guidance
    pub fn advice(&self) -> &str {
        &self.advice
    }

    /// Whether the card should be suspended immediately
    pub fn block_card(&self) -> bool {
        self.block_card
    }

    pub fn risk(&self) -> RiskScore {
        self.risk
    }

    /// One sentence naming the dominant cause of the score
    pub fn risk_explanation(&self) -> &str {
        &self.risk_explanation
    }

    pub fn risk_category(&self) -> RiskCategory {
        self.risk_category
    }

    /// Detected indicators, in detection order
    pub fn risk_signals(&self) -> &[String] {
        &self.risk_signals
    }
}

/// Customer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monetary amount in integer cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Inbound "classify support request" payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRequest {
    /// Free-text customer question
    pub question: String,

    /// Name used to address the customer
    pub customer_name: String,

    #[serde(default = "default_customer_id")]
    pub customer_id: CustomerId,

    /// Whether pending transactions count toward balance-dependent advice
    #[serde(default = "default_true")]
    pub include_pending: bool,
}

impl SupportRequest {
    /// Create a request for the default customer, including pending transactions
    pub fn new(question: impl Into<String>, customer_name: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            customer_name: customer_name.into(),
            customer_id: DEFAULT_CUSTOMER_ID,
            include_pending: true,
        }
    }

    pub fn with_customer_id(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    pub fn with_include_pending(mut self, include_pending: bool) -> Self {
        self.include_pending = include_pending;
        self
    }

    /// Reject requests that must never reach classification
    pub fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(Error::invalid_request("question must not be empty"));
        }
        if self.customer_name.trim().is_empty() {
            return Err(Error::invalid_request("customer_name must not be empty"));
        }
        Ok(())
    }
}

fn default_customer_id() -> CustomerId {
    DEFAULT_CUSTOMER_ID
}

fn default_true() -> bool {
    true
}

/// Account facts supplied by the customer context collaborator.
/// Looked up per request; never cached by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContext {
    pub customer_id: CustomerId,

    /// Balance as requested (with or without pending amounts)
    pub balance: Money,

    /// Whether `balance` includes pending transactions
    pub includes_pending: bool,

    /// Whether the account has uncleared transactions at all
    pub has_pending: bool,
}
