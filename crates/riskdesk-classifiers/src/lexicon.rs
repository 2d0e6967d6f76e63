//! Signal lexicon
//!
//! Static, ordered table of risk-indicating phrases. Each entry carries a
//! weight (0-10), a signal kind, and whether a match on its own warrants
//! suspending the card. Blocking is a property of the signal, not of the
//! score: a concerning but non-security question never implies a block.
//!
//! Lookup is a single Aho-Corasick pass over normalized text, case
//! insensitive, leftmost-longest. Phrases are normalized the same way at build
//! time, so `didn't make` also matches "didnt make". A phrase must start on a word boundary but
//! may run into a longer word, so `fraud` matches `fraudulently`.

use aho_corasick::{AhoCorasick, MatchKind};
use riskdesk_core::types::MAX_RISK;
use riskdesk_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::topic::normalize;

/// What a matched phrase indicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    CardTheft,
    CardLoss,
    Fraud,
    UnauthorizedActivity,
    AccountCompromise,
    Scam,
    SuspiciousActivity,
    UnrecognizedTransaction,
    BillingError,
    Dispute,
    CardDeclined,
    AccessIssue,
}

impl SignalKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CardTheft => "card_theft",
            Self::CardLoss => "card_loss",
            Self::Fraud => "fraud",
            Self::UnauthorizedActivity => "unauthorized_activity",
            Self::AccountCompromise => "account_compromise",
            Self::Scam => "scam",
            Self::SuspiciousActivity => "suspicious_activity",
            Self::UnrecognizedTransaction => "unrecognized_transaction",
            Self::BillingError => "billing_error",
            Self::Dispute => "dispute",
            Self::CardDeclined => "card_declined",
            Self::AccessIssue => "access_issue",
        }
    }
}

/// A single lexicon row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEntry {
    /// Phrase to look for (matched case-insensitively)
    pub phrase: String,

    /// Risk weight, 0-10
    pub weight: u8,

    pub kind: SignalKind,

    /// Whether this signal alone warrants blocking the card
    #[serde(default)]
    pub implies_block: bool,
}

impl SignalEntry {
    pub fn new(phrase: impl Into<String>, weight: u8, kind: SignalKind, implies_block: bool) -> Self {
        Self {
            phrase: phrase.into(),
            weight,
            kind,
            implies_block,
        }
    }
}

/// A lexicon entry found in a question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalMatch<'a> {
    pub entry: &'a SignalEntry,

    /// Declaration index of the entry; lower wins ties
    pub index: usize,
}

/// On-disk lexicon format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LexiconFile {
    signals: Vec<SignalEntry>,
}

// (phrase, weight, kind, implies_block), in declaration order
const BUILTIN_SIGNALS: &[(&str, u8, SignalKind, bool)] = &[
    // Critical: theft, fraud, loss
    ("stolen", 10, SignalKind::CardTheft, true),
    ("stole", 10, SignalKind::CardTheft, true),
    ("theft", 10, SignalKind::CardTheft, true),
    ("robbed", 10, SignalKind::CardTheft, true),
    ("pickpocketed", 10, SignalKind::CardTheft, true),
    ("fraud", 10, SignalKind::Fraud, true),
    ("cloned card", 9, SignalKind::Fraud, true),
    ("skimmed", 9, SignalKind::Fraud, true),
    ("skimming", 9, SignalKind::Fraud, true),
    ("lost", 9, SignalKind::CardLoss, true),
    ("misplaced my card", 9, SignalKind::CardLoss, true),
    ("can't find my card", 9, SignalKind::CardLoss, true),
    ("cannot find my card", 9, SignalKind::CardLoss, true),
    ("card is missing", 9, SignalKind::CardLoss, true),
    ("card went missing", 9, SignalKind::CardLoss, true),
    ("unauthorized", 9, SignalKind::UnauthorizedActivity, true),
    ("unauthorised", 9, SignalKind::UnauthorizedActivity, true),
    ("someone used my card", 9, SignalKind::UnauthorizedActivity, true),
    ("someone is using my card", 9, SignalKind::UnauthorizedActivity, true),
    ("hacked", 9, SignalKind::AccountCompromise, true),
    ("compromised", 9, SignalKind::AccountCompromise, true),
    ("someone accessed my account", 9, SignalKind::AccountCompromise, true),
    // Urgent
    ("didn't make", 8, SignalKind::UnauthorizedActivity, true),
    ("did not make", 8, SignalKind::UnauthorizedActivity, true),
    ("didn't authorize", 8, SignalKind::UnauthorizedActivity, true),
    ("did not authorize", 8, SignalKind::UnauthorizedActivity, true),
    ("didn't authorise", 8, SignalKind::UnauthorizedActivity, true),
    ("shared my pin", 8, SignalKind::AccountCompromise, true),
    ("phishing", 7, SignalKind::Scam, false),
    ("scam", 7, SignalKind::Scam, false),
    ("suspicious email", 6, SignalKind::Scam, false),
    ("suspicious text", 6, SignalKind::Scam, false),
    ("suspicious call", 6, SignalKind::Scam, false),
    // Concerning
    ("suspicious", 5, SignalKind::SuspiciousActivity, false),
    ("don't recognize", 5, SignalKind::UnrecognizedTransaction, false),
    ("don't recognise", 5, SignalKind::UnrecognizedTransaction, false),
    ("do not recognize", 5, SignalKind::UnrecognizedTransaction, false),
    ("unusual", 4, SignalKind::SuspiciousActivity, false),
    ("strange activity", 4, SignalKind::SuspiciousActivity, false),
    ("don't remember", 4, SignalKind::UnrecognizedTransaction, false),
    ("do not remember", 4, SignalKind::UnrecognizedTransaction, false),
    ("charged twice", 4, SignalKind::BillingError, false),
    ("double charged", 4, SignalKind::BillingError, false),
    ("overcharged", 4, SignalKind::BillingError, false),
    ("dispute", 4, SignalKind::Dispute, false),
    ("chargeback", 4, SignalKind::Dispute, false),
    ("wrong amount", 3, SignalKind::BillingError, false),
    ("refund", 3, SignalKind::Dispute, false),
    ("declined", 3, SignalKind::CardDeclined, false),
    ("card isn't working", 3, SignalKind::CardDeclined, false),
    ("card not working", 3, SignalKind::CardDeclined, false),
    ("locked out", 3, SignalKind::AccessIssue, false),
    ("forgot my pin", 3, SignalKind::AccessIssue, false),
    ("forgot my password", 3, SignalKind::AccessIssue, false),
];

/// Compiled signal lexicon
#[derive(Debug, Clone)]
pub struct SignalLexicon {
    entries: Vec<SignalEntry>,
    matcher: AhoCorasick,
}

impl SignalLexicon {
    /// Build a lexicon from entries in declaration order.
    ///
    /// Rejects empty phrases and weights above 10, so a score derived from
    /// this lexicon can never leave the valid range.
    pub fn new(entries: Vec<SignalEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::config("signal lexicon must contain at least one entry"));
        }

        for entry in &entries {
            if normalize(&entry.phrase).is_empty() {
                return Err(Error::config("signal lexicon contains an empty phrase"));
            }
            if entry.weight > MAX_RISK {
                return Err(Error::config(format!(
                    "signal '{}' has weight {} (maximum is {})",
                    entry.phrase, entry.weight, MAX_RISK
                )));
            }
        }

        let phrases: Vec<String> = entries
            .iter()
            .map(|e| normalize(&e.phrase))
            .collect();

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&phrases)
            .map_err(|e| Error::config(format!("Failed to build signal matcher: {}", e)))?;

        Ok(Self { entries, matcher })
    }

    /// The lexicon compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::new(
            BUILTIN_SIGNALS
                .iter()
                .map(|(phrase, weight, kind, block)| SignalEntry::new(*phrase, *weight, *kind, *block))
                .collect(),
        )
    }

    /// Load a lexicon from a YAML string with a top-level `signals` list
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: LexiconFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse signal lexicon: {}", e)))?;
        Self::new(file.signals)
    }

    /// Load a lexicon from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[SignalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find every entry present in `text`, each once, in order of first occurrence.
    ///
    /// `text` is expected to have been through [`normalize`].
    pub fn scan<'a>(&'a self, text: &str) -> Vec<SignalMatch<'a>> {
        let mut seen = vec![false; self.entries.len()];
        let mut matches = Vec::new();

        for m in self.matcher.find_iter(text) {
            if !starts_word(text, m.start()) {
                continue;
            }

            let index = m.pattern().as_usize();
            if std::mem::replace(&mut seen[index], true) {
                continue;
            }

            matches.push(SignalMatch {
                entry: &self.entries[index],
                index,
            });
        }

        matches
    }
}

/// The match that explains the score: highest weight, earliest declaration on ties
pub fn dominant<'m, 'a>(matches: &'m [SignalMatch<'a>]) -> Option<&'m SignalMatch<'a>> {
    matches.iter().max_by(|a, b| {
        a.entry
            .weight
            .cmp(&b.entry.weight)
            .then_with(|| b.index.cmp(&a.index))
    })
}

fn starts_word(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric())
}
