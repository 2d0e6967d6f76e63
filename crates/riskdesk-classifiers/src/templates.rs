//! Canned wording for deterministic decisions
//!
//! Explanations are single sentences with no internal terminal punctuation.
//! Advice greets the customer by name and never promises a card block unless
//! the decision actually blocks.

use riskdesk_core::CustomerContext;

use crate::lexicon::SignalKind;
use crate::topic::InquiryTopic;

/// One-sentence explanation for the signal that dominated the score
pub fn signal_explanation(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::CardTheft => {
            "The customer reported that their card or wallet was stolen, which exposes the account to immediate misuse."
        }
        SignalKind::CardLoss => {
            "The customer reported a lost card that could be used by whoever finds it."
        }
        SignalKind::Fraud => "The customer described fraudulent use of their card or account.",
        SignalKind::UnauthorizedActivity => {
            "The customer reported transactions on their account that they did not authorize."
        }
        SignalKind::AccountCompromise => {
            "The customer's account credentials or PIN may be compromised."
        }
        SignalKind::Scam => {
            "The customer mentioned a possible scam or phishing attempt targeting their banking details."
        }
        SignalKind::SuspiciousActivity => {
            "The customer noticed unusual account activity but did not confirm any unauthorized use."
        }
        SignalKind::UnrecognizedTransaction => {
            "The customer does not recognize a transaction that may still be legitimate."
        }
        SignalKind::BillingError => {
            "The customer reported a possible billing error such as a duplicate or incorrect charge."
        }
        SignalKind::Dispute => "The customer wants to dispute or reverse a charge.",
        SignalKind::CardDeclined => {
            "The customer's card is being declined, which is an inconvenience rather than a security threat."
        }
        SignalKind::AccessIssue => {
            "The customer is having trouble accessing their account or PIN."
        }
    }
}

/// One-sentence explanation for a question with no risk signals
pub fn routine_explanation(topic: InquiryTopic) -> &'static str {
    match topic {
        InquiryTopic::Balance => "The question is a routine balance inquiry with no risk indicators.",
        InquiryTopic::Transactions => {
            "The question is a routine request about transaction history with no risk indicators."
        }
        InquiryTopic::AccountDetails => {
            "The question is a routine account maintenance request with no risk indicators."
        }
        InquiryTopic::General => "The question contains no risk indicators and is a routine request.",
    }
}

/// Advice for the dominant signal. `block_card` reflects the final decision,
/// which may come from a different matched signal.
pub fn signal_advice(kind: SignalKind, name: &str, block_card: bool) -> String {
    let body = match kind {
        SignalKind::CardTheft => {
            "I'm sorry to hear your card was stolen. A replacement card will be sent to your address on file, and we recommend reporting the theft to the police."
        }
        SignalKind::CardLoss => {
            "I'm sorry to hear that. If you find the card later you can contact us to restore it, otherwise a replacement will be sent to your address on file."
        }
        SignalKind::Fraud => {
            "our fraud team will review the recent activity on your account. Please do not share one-time passcodes with anyone while the review is open."
        }
        SignalKind::UnauthorizedActivity => {
            "thank you for flagging those charges. We are opening an investigation into the payments you did not make and will contact you with the outcome."
        }
        SignalKind::AccountCompromise => {
            "please change your online banking password and PIN as soon as possible and review your recent transactions."
        }
        SignalKind::Scam => {
            "please do not reply to the message or share any card details, passcodes, or passwords. The bank will never ask for your PIN, and if you already shared details you should contact us right away."
        }
        SignalKind::SuspiciousActivity => {
            "please review your recent transactions in the app. If you spot anything you did not make, contact us straight away."
        }
        SignalKind::UnrecognizedTransaction => {
            "check the merchant name and date in the transaction details, since purchases sometimes appear under a different business name. If you still don't recognize it, we can open a dispute for you."
        }
        SignalKind::BillingError => {
            "we can look into that charge for you. Duplicate or incorrect charges are usually corrected by the merchant, and if not we can raise a dispute on your behalf."
        }
        SignalKind::Dispute => {
            "you can start a dispute from the transaction details in the app or we can open one for you. Please keep any receipts or correspondence with the merchant."
        }
        SignalKind::CardDeclined => {
            "card declines are often caused by spending limits, an incorrect PIN, or an expired card. Please check your card details in the app and contact us if the problem continues."
        }
        SignalKind::AccessIssue => {
            "you can reset your PIN or password securely from the app or at any branch. We will never ask for your full password."
        }
    };

    let mut advice = format!("Hello {}, {}", name, body);
    if block_card {
        advice.push_str(
            " We have temporarily blocked your card to prevent further transactions.",
        );
    } else if matches!(kind, SignalKind::SuspiciousActivity | SignalKind::Scam) {
        advice.push_str(" Your card remains active for now.");
    }
    advice
}

/// Advice for a question with no risk signals
pub fn routine_advice(
    topic: InquiryTopic,
    name: &str,
    context: Option<&CustomerContext>,
) -> String {
    let body = match (topic, context) {
        (InquiryTopic::Balance, Some(ctx)) if ctx.includes_pending => format!(
            "your current balance, including pending transactions, is {}.",
            ctx.balance
        ),
        (InquiryTopic::Balance, Some(ctx)) if ctx.has_pending => format!(
            "your current cleared balance is {}. Pending transactions are not included in this amount.",
            ctx.balance
        ),
        (InquiryTopic::Balance, Some(ctx)) => {
            format!("your current balance is {}.", ctx.balance)
        }
        (InquiryTopic::Balance, None) => {
            "I can't retrieve your balance right now. Please check the mobile app or try again in a few minutes."
                .to_string()
        }
        (InquiryTopic::Transactions, ctx) => {
            let mut body = "you can see your recent transactions in the app under Activity, and monthly statements are available to download.".to_string();
            if ctx.is_some_and(|c| c.has_pending) {
                body.push_str(" Some transactions are still pending and may take a few days to clear.");
            }
            body
        }
        (InquiryTopic::AccountDetails, _) => {
            "you can update your contact details in the app under Profile, or at any branch with photo ID."
                .to_string()
        }
        (InquiryTopic::General, _) => {
            "thanks for reaching out. I can help with balances, transactions, card problems, and account updates, so let me know what you need."
                .to_string()
        }
    };

    format!("Hello {}, {}", name, body)
}
