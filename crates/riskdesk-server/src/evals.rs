//! Evaluation suite
//!
//! Runs a set of labelled support questions through the orchestrator and
//! checks the block decision, risk range, category, and signals of each
//! answer. Scenarios run concurrently.

use anyhow::Result;
use futures::future::join_all;
use riskdesk_core::{RiskCategory, SupportRequest};
use riskdesk_orchestrator::Orchestrator;
use riskdesk_telemetry::ServedBy;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// One labelled question with the decision it should get
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalScenario {
    pub name: String,
    pub question: String,

    #[serde(default = "default_customer_name")]
    pub customer_name: String,

    pub expected_block_card: bool,

    /// Inclusive `[low, high]` risk range
    pub expected_risk_range: (u8, u8),

    pub expected_category: RiskCategory,

    /// At least one must be reported; empty means no signal is required
    #[serde(default)]
    pub expected_signals: Vec<String>,
}

fn default_customer_name() -> String {
    "John".to_string()
}

impl EvalScenario {
    #[allow(clippy::too_many_arguments)]
    fn new(
        name: &str,
        question: &str,
        customer_name: &str,
        expected_block_card: bool,
        expected_risk_range: (u8, u8),
        expected_category: RiskCategory,
        expected_signals: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            question: question.to_string(),
            customer_name: customer_name.to_string(),
            expected_block_card,
            expected_risk_range,
            expected_category,
            expected_signals: expected_signals.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The built-in scenario set
pub fn builtin_scenarios() -> Vec<EvalScenario> {
    use RiskCategory::*;

    vec![
        // Security: block
        EvalScenario::new(
            "lost_card",
            "I lost my credit card",
            "John Doe",
            true,
            (9, 10),
            Critical,
            &["lost"],
        ),
        EvalScenario::new(
            "stolen_card",
            "My card was stolen from my wallet",
            "Jane Smith",
            true,
            (9, 10),
            Critical,
            &["stolen"],
        ),
        EvalScenario::new(
            "unauthorized_transactions",
            "I see charges on my account that I didn't make",
            "Bob Wilson",
            true,
            (6, 8),
            Urgent,
            &["didn't make", "unauthorized"],
        ),
        EvalScenario::new(
            "fraud_suspicion",
            "I think someone is using my card fraudulently",
            "Alice Brown",
            true,
            (9, 10),
            Critical,
            &["fraud", "fraudulently"],
        ),
        // Routine: no block
        EvalScenario::new(
            "balance_inquiry",
            "What is my current account balance?",
            "Mary Johnson",
            false,
            (0, 2),
            Routine,
            &[],
        ),
        EvalScenario::new(
            "transaction_history",
            "Can you show me my recent transactions?",
            "David Lee",
            false,
            (0, 2),
            Routine,
            &[],
        ),
        EvalScenario::new(
            "account_info",
            "I need to update my contact information",
            "Sarah Davis",
            false,
            (0, 2),
            Routine,
            &[],
        ),
        // Concerning: elevated risk, no block
        EvalScenario::new(
            "forgotten_transaction",
            "I don't remember making this purchase, but it might be mine",
            "Mike Chen",
            false,
            (3, 5),
            Concerning,
            &["don't remember"],
        ),
        EvalScenario::new(
            "suspicious_activity",
            "I noticed some unusual activity on my account but I'm not sure",
            "Lisa Rodriguez",
            false,
            (3, 5),
            Concerning,
            &["unusual", "suspicious"],
        ),
    ]
}

/// Load scenarios from a YAML list
pub fn load_scenarios(path: impl AsRef<Path>) -> Result<Vec<EvalScenario>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let scenarios: Vec<EvalScenario> = serde_yaml::from_str(&content)?;
    anyhow::ensure!(!scenarios.is_empty(), "scenario file contains no scenarios");
    Ok(scenarios)
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub name: String,
    pub passed: bool,

    /// Human-readable reasons for a failure
    pub failures: Vec<String>,

    pub risk: Option<u8>,
    pub risk_category: Option<RiskCategory>,
    pub block_card: Option<bool>,
    pub risk_signals: Vec<String>,
    pub served_by: Option<ServedBy>,
}

/// Results of a whole suite run
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub results: Vec<ScenarioResult>,
}

impl EvalReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn pass_rate(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            self.passed() as f64 / self.total() as f64
        }
    }

    /// Plain-text report, one line per scenario plus a summary
    pub fn render(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            let status = if result.passed { "PASS" } else { "FAIL" };
            let _ = write!(out, "[{}] {:<28}", status, result.name);
            if let (Some(risk), Some(category)) = (result.risk, result.risk_category) {
                let _ = write!(
                    out,
                    " risk={:<2} category={:<10} block={}",
                    risk,
                    category,
                    result.block_card.unwrap_or(false)
                );
            }
            out.push('\n');
            for failure in &result.failures {
                let _ = writeln!(out, "       - {}", failure);
            }
        }
        let _ = writeln!(
            out,
            "\n{}/{} scenarios passed ({:.0}%)",
            self.passed(),
            self.total(),
            self.pass_rate() * 100.0
        );
        out
    }
}

/// Run every scenario through `orchestrator` concurrently
pub async fn run_suite(orchestrator: &Orchestrator, scenarios: &[EvalScenario]) -> EvalReport {
    let runs = scenarios.iter().map(|scenario| run_scenario(orchestrator, scenario));
    EvalReport {
        results: join_all(runs).await,
    }
}

async fn run_scenario(orchestrator: &Orchestrator, scenario: &EvalScenario) -> ScenarioResult {
    let request = SupportRequest::new(scenario.question.clone(), scenario.customer_name.clone());

    let outcome = match orchestrator.classify(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            return ScenarioResult {
                name: scenario.name.clone(),
                passed: false,
                failures: vec![format!("classification failed: {}", e)],
                risk: None,
                risk_category: None,
                block_card: None,
                risk_signals: Vec::new(),
                served_by: None,
            }
        }
    };

    let bundle = &outcome.bundle;
    let mut failures = Vec::new();

    if bundle.block_card() != scenario.expected_block_card {
        failures.push(format!(
            "block_card was {}, expected {}",
            bundle.block_card(),
            scenario.expected_block_card
        ));
    }

    let (low, high) = scenario.expected_risk_range;
    let risk = bundle.risk().value();
    if !(low..=high).contains(&risk) {
        failures.push(format!("risk {} outside expected range {}-{}", risk, low, high));
    }

    if bundle.risk_category() != scenario.expected_category {
        failures.push(format!(
            "category was {}, expected {}",
            bundle.risk_category(),
            scenario.expected_category
        ));
    }

    if !scenario.expected_signals.is_empty()
        && !signals_overlap(bundle.risk_signals(), &scenario.expected_signals)
    {
        failures.push(format!(
            "none of {:?} reported (got {:?})",
            scenario.expected_signals,
            bundle.risk_signals()
        ));
    }

    ScenarioResult {
        name: scenario.name.clone(),
        passed: failures.is_empty(),
        failures,
        risk: Some(risk),
        risk_category: Some(bundle.risk_category()),
        block_card: Some(bundle.block_card()),
        risk_signals: bundle.risk_signals().to_vec(),
        served_by: Some(outcome.served_by),
    }
}

/// Loose match: a reported signal and an expected one contain each other
fn signals_overlap(reported: &[String], expected: &[String]) -> bool {
    expected.iter().any(|want| {
        let want = want.to_lowercase();
        reported.iter().any(|got| {
            let got = got.to_lowercase();
            got.contains(&want) || want.contains(&got)
        })
    })
}
