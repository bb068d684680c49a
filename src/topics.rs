//! Topic classification
//!
//! Maps free text onto the fixed topic label set. The production model runs
//! behind the same trait; this in-process classifier scores keyword hits and
//! is deterministic for a given keyword table.

use crate::engine::traits::TopicClassifier;
use async_trait::async_trait;
use thiserror::Error;

/// The closed label set every classifier implementation must stay within.
pub const TOPICS: [&str; 5] = ["swedish", "bank", "pn", "apartment", "culture"];

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("message did not match any known topic")]
    Unmatched,
}

/// Keyword-scoring classifier over the fixed topic set
pub struct KeywordClassifier {
    rules: Vec<(&'static str, &'static [&'static str])>,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        // Tie-breaks resolve in declaration order.
        Self {
            rules: vec![
                (
                    "swedish",
                    &["sfi", "swedish", "svenska", "language", "course"],
                ),
                ("bank", &["bank", "bankid", "account", "swish", "loan"]),
                (
                    "pn",
                    &["personnummer", "personal number", "skatteverket", "id card"],
                ),
                (
                    "apartment",
                    &["apartment", "housing", "rent", "lease", "landlord"],
                ),
                ("culture", &["culture", "museum", "event", "concert"]),
            ],
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TopicClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<String, ClassifyError> {
        let haystack = text.to_lowercase();

        let mut best: Option<(&str, usize)> = None;
        for &(topic, keywords) in &self.rules {
            let hits = keywords
                .iter()
                .filter(|keyword| haystack.contains(**keyword))
                .count();
            if hits > 0 && best.map_or(true, |(_, score)| hits > score) {
                best = Some((topic, hits));
            }
        }

        match best {
            Some((topic, _)) => Ok(topic.to_string()),
            None => Err(ClassifyError::Unmatched),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sfi_classifies_as_swedish() {
        let classifier = KeywordClassifier::new();
        let topic = classifier.classify("I want to start SFI").await.unwrap();
        assert_eq!(topic, "swedish");
    }

    #[tokio::test]
    async fn test_labels_stay_within_fixed_set() {
        let classifier = KeywordClassifier::new();
        for text in [
            "how do I open a bank account?",
            "where can I get a personnummer",
            "looking for an apartment to rent",
            "any museum events this week?",
        ] {
            let topic = classifier.classify(text).await.unwrap();
            assert!(TOPICS.contains(&topic.as_str()), "unexpected label {topic}");
        }
    }

    #[tokio::test]
    async fn test_unmatched_text_fails() {
        let classifier = KeywordClassifier::new();
        assert!(matches!(
            classifier.classify("zzzz").await,
            Err(ClassifyError::Unmatched)
        ));
    }

    #[tokio::test]
    async fn test_deterministic_for_same_input() {
        let classifier = KeywordClassifier::new();
        let first = classifier.classify("bank and housing").await.unwrap();
        let second = classifier.classify("bank and housing").await.unwrap();
        assert_eq!(first, second);
    }
}
