//! Best-effort extraction of labeled fields from free-form model output.
//!
//! Every extractor returns an `Extracted<T>`: either the value found in the
//! text or the field's documented default. Nothing here returns an error; a
//! missing or garbled field is recorded as `Defaulted` so callers can log it.

use std::sync::LazyLock;

use regex::Regex;

/// Result of pulling one field out of model output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extracted<T> {
    Found(T),
    Defaulted(T),
}

impl<T> Extracted<T> {
    pub fn value(self) -> T {
        match self {
            Self::Found(v) | Self::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted(_))
    }
}

/// Integer rating with an inclusive range and a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingPolicy {
    pub min: u8,
    pub max: u8,
    pub default: u8,
}

/// Rubric ratings: 1..=10, missing means 6.
pub const RUBRIC_RATING: RatingPolicy = RatingPolicy {
    min: 1,
    max: 10,
    default: 6,
};

impl RatingPolicy {
    /// Clamp a parsed digit string into range. Digit strings too long for
    /// `u64` are larger than any range and clamp to `max`.
    fn clamp_digits(&self, digits: &str) -> u8 {
        match digits.parse::<u64>() {
            Ok(n) => n.clamp(u64::from(self.min), u64::from(self.max)) as u8,
            Err(_) => self.max,
        }
    }
}

/// Float score that must fall inside a range; anything else means default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePolicy {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

/// Advisory topic-fit score: 1.0..=5.0, missing or out of range means 3.0.
pub const ADVISORY_SCORE: ScorePolicy = ScorePolicy {
    min: 1.0,
    max: 5.0,
    default: 3.0,
};

static VERDICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CLASSIFICATION:\s*\[?\s*(YES|NO)\b").unwrap());

static ADVISORY_SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SCORE:\s*\[?\s*(\d+(?:\.\d+)?)").unwrap());

/// A rubric rating label followed by an integer.
static RATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(relevance|content|writing|original|impact)\s*:\s*\[?\s*(\d+)").unwrap()
});

/// A free-text section label anywhere in the output.
static SECTION_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(strengths|topics)\s*:").unwrap());

/// A section label heading a line; only these end a free-text capture.
static SECTION_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(relevance|content|writing|original|impact|strengths|topics)\s*:")
        .unwrap()
});

/// `Some(true)` for `CLASSIFICATION: YES`, `Some(false)` for `NO`, `None` when absent.
pub fn classification_flag(output: &str) -> Option<bool> {
    VERDICT_RE
        .captures(output)
        .map(|caps| caps[1].eq_ignore_ascii_case("yes"))
}

/// The `SCORE:` value under `ADVISORY_SCORE`.
pub fn advisory_score(output: &str) -> Extracted<f64> {
    let policy = ADVISORY_SCORE;
    ADVISORY_SCORE_RE
        .captures(output)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .filter(|v| (policy.min..=policy.max).contains(v))
        .map_or(Extracted::Defaulted(policy.default), Extracted::Found)
}

/// First integer after `label:` (case-insensitive), clamped by `policy`.
///
/// `label` is one of the rubric labels: relevance, content, writing,
/// original, impact. Any other label yields the default.
pub fn labeled_rating(output: &str, label: &str, policy: RatingPolicy) -> Extracted<u8> {
    RATING_RE
        .captures_iter(output)
        .find(|caps| caps[1].eq_ignore_ascii_case(label))
        .map(|caps| Extracted::Found(policy.clamp_digits(&caps[2])))
        .unwrap_or(Extracted::Defaulted(policy.default))
}

/// Text after `label:` up to the next line that starts with a known section
/// label, or end of text. `label` is `Strengths` or `Topics`.
///
/// Surrounding whitespace and square brackets are trimmed; an empty capture
/// counts as absent and yields `default`.
pub fn section_text(output: &str, label: &str, default: &str) -> Extracted<String> {
    let Some(start) = SECTION_START_RE
        .captures_iter(output)
        .find(|caps| caps[1].eq_ignore_ascii_case(label))
        .and_then(|caps| caps.get(0))
    else {
        return Extracted::Defaulted(default.to_string());
    };

    let rest = &output[start.end()..];
    let end = SECTION_END_RE
        .find(rest)
        .map_or(rest.len(), |next| next.start());
    let captured = rest[..end]
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim();

    if captured.is_empty() {
        Extracted::Defaulted(default.to_string())
    } else {
        Extracted::Found(captured.to_string())
    }
}

/// The first `max_chars` characters of `text`, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_flag_is_case_insensitive() {
        assert_eq!(classification_flag("classification: yes"), Some(true));
        assert_eq!(classification_flag("CLASSIFICATION: [NO]"), Some(false));
        assert_eq!(classification_flag("TOPIC: Other"), None);
    }

    #[test]
    fn advisory_score_defaults_when_absent_or_out_of_range() {
        assert_eq!(advisory_score("SCORE: 4.5"), Extracted::Found(4.5));
        assert_eq!(advisory_score("SCORE: [2]"), Extracted::Found(2.0));
        assert_eq!(advisory_score("no score here"), Extracted::Defaulted(3.0));
        assert_eq!(advisory_score("SCORE: 7.5"), Extracted::Defaulted(3.0));
        assert_eq!(advisory_score("SCORE: high"), Extracted::Defaulted(3.0));
    }

    #[test]
    fn rating_is_clamped() {
        assert_eq!(
            labeled_rating("Impact: 14", "impact", RUBRIC_RATING),
            Extracted::Found(10)
        );
        assert_eq!(
            labeled_rating("impact: 0", "Impact", RUBRIC_RATING),
            Extracted::Found(1)
        );
        assert_eq!(
            labeled_rating("Impact: 99999999999999999999999", "Impact", RUBRIC_RATING),
            Extracted::Found(10)
        );
    }

    #[test]
    fn rating_without_integer_defaults() {
        assert_eq!(
            labeled_rating("Writing: excellent", "Writing", RUBRIC_RATING),
            Extracted::Defaulted(6)
        );
        assert_eq!(
            labeled_rating("", "Writing", RUBRIC_RATING),
            Extracted::Defaulted(6)
        );
    }

    #[test]
    fn rating_takes_first_integer_after_label() {
        assert_eq!(
            labeled_rating("Content: 7/10 (was 9)", "Content", RUBRIC_RATING),
            Extracted::Found(7)
        );
    }

    #[test]
    fn section_stops_at_next_label() {
        let out = "Impact: 8\nStrengths: vivid imagery, strong close\nTopics: flag hoisting";
        assert_eq!(
            section_text(out, "Strengths", "none").value(),
            "vivid imagery, strong close"
        );
        assert_eq!(section_text(out, "Topics", "none").value(), "flag hoisting");
    }

    #[test]
    fn label_words_inside_a_line_do_not_end_a_section() {
        let out = "Impact: 8\nStrengths: strong emotional content: a moving flag scene\nTopics: Red Fort";
        assert_eq!(
            section_text(out, "Strengths", "none").value(),
            "strong emotional content: a moving flag scene"
        );
        assert_eq!(section_text(out, "Topics", "none").value(), "Red Fort");
        assert_eq!(
            labeled_rating(out, "Content", RUBRIC_RATING),
            Extracted::Defaulted(6)
        );
    }

    #[test]
    fn ratings_are_matched_by_their_own_label() {
        let out = "Relevance: 9\nContent: 4\nwriting: [7]";
        assert_eq!(labeled_rating(out, "Relevance", RUBRIC_RATING), Extracted::Found(9));
        assert_eq!(labeled_rating(out, "content", RUBRIC_RATING), Extracted::Found(4));
        assert_eq!(labeled_rating(out, "Writing", RUBRIC_RATING), Extracted::Found(7));
        assert_eq!(labeled_rating(out, "Impact", RUBRIC_RATING), Extracted::Defaulted(6));
        assert_eq!(labeled_rating(out, "Grammar", RUBRIC_RATING), Extracted::Defaulted(6));
    }

    #[test]
    fn section_missing_or_empty_defaults() {
        assert_eq!(
            section_text("Relevance: 8", "Strengths", "fallback"),
            Extracted::Defaulted("fallback".to_string())
        );
        assert!(section_text("Strengths:   \nTopics: x", "Strengths", "fallback").is_defaulted());
    }

    #[test]
    fn section_strips_brackets() {
        assert_eq!(
            section_text("Topics: [Gandhi, Red Fort]", "Topics", "-").value(),
            "Gandhi, Red Fort"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("तिरंगा flag", 3), "तिर");
        assert_eq!(truncate_chars("short", 800), "short");
        assert_eq!(truncate_chars("abcdef", 0), "");
    }
}
