//! Instruction contract sent to generative backends

use riskdesk_core::types::MAX_RISK;
use riskdesk_core::RiskCategory;

/// Render the fixed instruction contract for one customer.
///
/// Category bounds come from [`RiskCategory::ALL`], so the text cannot drift
/// from the partition the validator enforces.
pub fn contract(customer_name: &str) -> String {
    let mut text = String::from(
        "You are a support agent in our bank. Give the customer support and judge the risk level of their query.\n\
         Reply with a single JSON object and nothing else. It must have exactly these keys:\n\
         - support_advice: string, advice returned to the customer\n\
         - block_card: boolean, whether to block the customer's card\n",
    );
    text.push_str(&format!("- risk: integer from 0 to {}\n", MAX_RISK));
    text.push_str(
        "- risk_explanation: string, exactly one sentence naming the main cause of the risk score\n\
         - risk_category: string, one of routine, concerning, urgent, critical\n\
         - risk_signals: array of strings, the words or phrases from the query that indicate risk\n\
         \n\
         Risk levels:\n",
    );

    for category in RiskCategory::ALL {
        let (low, high) = category.bounds();
        text.push_str(&format!(
            "- {}-{}: {} ({})\n",
            low,
            high,
            category.description(),
            category.label()
        ));
    }

    text.push_str(
        "risk_category must be the level that contains risk.\n\
         Set block_card to true only if the customer indicates card loss or theft, fraud, \
         or transactions they did not make. A high risk score alone does not require a block.\n",
    );
    text.push_str(&format!(
        "The customer's name is {}. Address them by name.\n",
        customer_name.trim()
    ));

    text
}
