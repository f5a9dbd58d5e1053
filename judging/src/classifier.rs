//! Topic classification with a deterministic keyword fallback.
//!
//! The model's `CLASSIFICATION:` line decides first. Only a provisional
//! `Excluded` can be overturned, and only when the essay's full text carries
//! at least two inclusion keywords and more inclusion than exclusion keywords.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::extract;
use crate::inference::{GenerateOptions, InferenceBackend};
use crate::model::{ClassificationResult, Item, KeywordTally, Verdict};
use crate::prompts;

/// Phrases that indicate an Independence Day essay.
pub const INCLUSION_KEYWORDS: &[&str] = &[
    "independence day",
    "august 15",
    "15th august",
    "freedom struggle",
    "british rule",
    "gandhi",
    "nehru",
    "freedom fighter",
    "patriotic",
    "tiranga",
    "tricolor",
    "national flag",
    "red fort",
    "partition",
];

/// Phrases that indicate an essay on some other topic.
pub const EXCLUSION_KEYWORDS: &[&str] = &[
    "social media",
    "facebook",
    "instagram",
    "environmental protection",
    "climate change",
    "career goals",
    "software engineer",
    "online education",
    "covid-19",
    "sports importance",
    "basketball",
    "cricket",
    "wings of fire",
];

/// Count distinct keywords of each set present in `text` (case-insensitive).
pub fn tally_keywords(text: &str) -> KeywordTally {
    let lower = text.to_lowercase();
    let count = |set: &[&str]| set.iter().filter(|k| lower.contains(*k)).count();
    KeywordTally {
        inclusion: count(INCLUSION_KEYWORDS),
        exclusion: count(EXCLUSION_KEYWORDS),
    }
}

/// Turn a successful model response into a classification for `full_text`.
pub fn interpret(output: &str, full_text: &str) -> ClassificationResult {
    let provisional = match extract::classification_flag(output) {
        Some(true) => Verdict::Included,
        _ => Verdict::Excluded,
    };

    let keywords = tally_keywords(full_text);
    let overridden = provisional == Verdict::Excluded && keywords.favors_inclusion();
    let verdict = if overridden {
        Verdict::Included
    } else {
        provisional
    };

    ClassificationResult {
        verdict,
        model_score: Some(extract::advisory_score(output).value()),
        raw_output: output.to_string(),
        overridden,
        keywords,
    }
}

pub struct Classifier {
    backend: Arc<dyn InferenceBackend>,
    options: GenerateOptions,
}

impl Classifier {
    pub fn new(backend: Arc<dyn InferenceBackend>, options: GenerateOptions) -> Self {
        Self { backend, options }
    }

    /// Classify one item. Never fails: a failed call yields `Verdict::Error`.
    pub async fn classify(&self, item: &Item) -> ClassificationResult {
        let prompt = prompts::classification_prompt(&item.raw_text);
        match self.backend.generate(&prompt, &self.options).await {
            Ok(output) => {
                let result = interpret(&output, &item.raw_text);
                if result.overridden {
                    debug!(
                        item = %item.id,
                        inclusion = result.keywords.inclusion,
                        exclusion = result.keywords.exclusion,
                        "keyword fallback overrode model verdict"
                    );
                }
                result
            }
            Err(e) => {
                warn!(item = %item.id, zone = %item.zone_name, error = %e, "classification failed");
                ClassificationResult::error(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::InferenceError;
    use crate::inference::MockInferenceBackend;

    fn item(text: &str) -> Item {
        Item::new("essay.txt", text, "/zone/essay.txt", "North")
    }

    fn classifier(mock: MockInferenceBackend) -> Classifier {
        Classifier::new(
            Arc::new(mock),
            GenerateOptions::new(0.1, Duration::from_secs(90)),
        )
    }

    #[test]
    fn yes_is_included_without_override() {
        let result = interpret("TOPIC: Independence Day\nCLASSIFICATION: YES\nSCORE: 4.5", "");
        assert_eq!(result.verdict, Verdict::Included);
        assert!(!result.overridden);
        assert_eq!(result.model_score, Some(4.5));
    }

    #[test]
    fn yes_is_kept_despite_exclusion_keywords() {
        let text = "My Instagram and Facebook feeds are full of cricket and basketball, \
                    and social media talks about climate change.";
        let result = interpret("CLASSIFICATION: YES\nSCORE: 4", text);
        assert_eq!(result.verdict, Verdict::Included);
        assert!(!result.overridden);
        assert_eq!(result.keywords.inclusion, 0);
        assert_eq!(result.keywords.exclusion, 6);
    }

    #[test]
    fn two_inclusion_keywords_override_no() {
        let text = "Gandhi and Nehru led the nation.";
        let result = interpret("CLASSIFICATION: NO", text);
        assert_eq!(result.verdict, Verdict::Included);
        assert!(result.overridden);
        assert_eq!(result.keywords.inclusion, 2);
        assert_eq!(result.keywords.exclusion, 0);
    }

    #[test]
    fn single_inclusion_keyword_stays_excluded() {
        let result = interpret("CLASSIFICATION: NO", "A short note about Gandhi.");
        assert_eq!(result.verdict, Verdict::Excluded);
        assert!(!result.overridden);
    }

    #[test]
    fn exclusion_keywords_block_override() {
        let text = "Gandhi, Nehru, cricket, basketball and social media.";
        let result = interpret("CLASSIFICATION: NO", text);
        assert_eq!(result.verdict, Verdict::Excluded);
    }

    #[test]
    fn missing_verdict_line_is_provisionally_excluded() {
        let result = interpret("I think this is a lovely essay.", "My career goals.");
        assert_eq!(result.verdict, Verdict::Excluded);
        assert_eq!(result.model_score, Some(3.0));
    }

    #[test]
    fn keywords_scan_full_text_not_excerpt() {
        let mut text = "filler ".repeat(200);
        text.push_str("Red Fort. The tricolor was raised on August 15.");
        assert!(text.chars().count() > prompts::CLASSIFY_EXCERPT_CHARS);
        let result = interpret("CLASSIFICATION: NO", &text);
        assert_eq!(result.verdict, Verdict::Included);
        assert_eq!(result.keywords.inclusion, 3);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        let tally = tally_keywords("gandhi Gandhi GANDHI");
        assert_eq!(tally.inclusion, 1);
    }

    #[tokio::test]
    async fn transport_failure_yields_error_verdict() {
        let mut mock = MockInferenceBackend::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Err(InferenceError::Transport("connection refused".into())));

        let result = classifier(mock)
            .classify(&item("Gandhi Nehru patriotic"))
            .await;
        assert_eq!(result.verdict, Verdict::Error);
        assert_eq!(result.model_score, None);
        assert!(result.raw_output.contains("connection refused"));
    }

    #[tokio::test]
    async fn prompt_carries_truncated_text() {
        let mut mock = MockInferenceBackend::new();
        mock.expect_generate()
            .withf(|prompt, opts| {
                prompt.contains("Essay to classify:")
                    && !prompt.contains("TAIL")
                    && opts.temperature < 0.2
            })
            .times(1)
            .returning(|_, _| Ok("CLASSIFICATION: YES\nSCORE: 5.0".to_string()));

        let text = format!("{}TAIL", "a".repeat(prompts::CLASSIFY_EXCERPT_CHARS));
        let result = classifier(mock).classify(&item(&text)).await;
        assert_eq!(result.verdict, Verdict::Included);
        assert_eq!(result.model_score, Some(5.0));
    }
}
