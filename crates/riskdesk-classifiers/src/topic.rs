//! Question normalization and routine topic detection

use aho_corasick::{AhoCorasick, MatchKind};
use riskdesk_core::{Error, Result};

/// Lowercase, collapse whitespace, and drop apostrophes so "Didn’t   Make",
/// "didn't make" and "didnt make" scan identically.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.replace(['\'', '\u{2018}', '\u{2019}'], ""))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// What a question without risk signals is about. Only used to pick advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InquiryTopic {
    Balance,
    Transactions,
    AccountDetails,
    General,
}

const TOPIC_KEYWORDS: &[(&str, InquiryTopic)] = &[
    ("balance", InquiryTopic::Balance),
    ("how much money", InquiryTopic::Balance),
    ("how much do i have", InquiryTopic::Balance),
    ("available funds", InquiryTopic::Balance),
    ("funds available", InquiryTopic::Balance),
    ("transaction", InquiryTopic::Transactions),
    ("statement", InquiryTopic::Transactions),
    ("purchase history", InquiryTopic::Transactions),
    ("recent payments", InquiryTopic::Transactions),
    ("spending", InquiryTopic::Transactions),
    ("contact information", InquiryTopic::AccountDetails),
    ("contact details", InquiryTopic::AccountDetails),
    ("address", InquiryTopic::AccountDetails),
    ("phone number", InquiryTopic::AccountDetails),
    ("email", InquiryTopic::AccountDetails),
    ("account info", InquiryTopic::AccountDetails),
];

/// Keyword matcher for routine topics; the earliest keyword in the text wins
#[derive(Debug, Clone)]
pub struct TopicDetector {
    matcher: AhoCorasick,
}

impl TopicDetector {
    pub fn new() -> Result<Self> {
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(TOPIC_KEYWORDS.iter().map(|(keyword, _)| keyword))
            .map_err(|e| Error::config(format!("Failed to build topic matcher: {}", e)))?;

        Ok(Self { matcher })
    }

    pub fn detect(&self, text: &str) -> InquiryTopic {
        self.matcher
            .find(text)
            .map(|m| TOPIC_KEYWORDS[m.pattern().as_usize()].1)
            .unwrap_or(InquiryTopic::General)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  I  Didn\u{2019}t\tMake   this "), "i didnt make this");
        assert_eq!(normalize("I don't  ' know"), "i dont know");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_topic_detection() {
        let topics = TopicDetector::new().unwrap();
        assert_eq!(topics.detect("what is my current account balance?"), InquiryTopic::Balance);
        assert_eq!(
            topics.detect("can you show me my recent transactions?"),
            InquiryTopic::Transactions
        );
        assert_eq!(
            topics.detect("i need to update my contact information"),
            InquiryTopic::AccountDetails
        );
        assert_eq!(topics.detect("help me with my account"), InquiryTopic::General);
    }

    #[test]
    fn test_earliest_topic_keyword_wins() {
        let topics = TopicDetector::new().unwrap();
        assert_eq!(
            topics.detect("send my statement to my new address"),
            InquiryTopic::Transactions
        );
    }
}
