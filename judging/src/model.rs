//! Domain types shared across the pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One submission, read once and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier within a zone (the file name for folder intake).
    pub id: String,
    pub raw_text: String,
    pub source: PathBuf,
    pub zone_name: String,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        raw_text: impl Into<String>,
        source: impl Into<PathBuf>,
        zone_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            raw_text: raw_text.into(),
            source: source.into(),
            zone_name: zone_name.into(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.raw_text.split_whitespace().count()
    }
}

/// Classification outcome for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Included,
    Excluded,
    /// The inference call failed; `raw_output` carries the failure message.
    Error,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Included => write!(f, "included"),
            Self::Excluded => write!(f, "excluded"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Keyword matches found in an item's full text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTally {
    pub inclusion: usize,
    pub exclusion: usize,
}

impl KeywordTally {
    /// Enough on-topic evidence to overturn a model `NO`.
    pub fn favors_inclusion(&self) -> bool {
        self.inclusion > self.exclusion && self.inclusion >= 2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub verdict: Verdict,
    /// Advisory 1.0–5.0 topic fit; `None` when the call failed.
    pub model_score: Option<f64>,
    pub raw_output: String,
    /// True when the keyword heuristic turned a model `NO` into `Included`.
    pub overridden: bool,
    pub keywords: KeywordTally,
}

impl ClassificationResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Error,
            model_score: None,
            raw_output: message.into(),
            overridden: false,
            keywords: KeywordTally::default(),
        }
    }

    pub fn is_included(&self) -> bool {
        self.verdict == Verdict::Included
    }
}

/// An item together with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    pub item: Item,
    pub classification: ClassificationResult,
}
