//! Five-dimension rubric scoring.
//!
//! A `ScoreReport` always carries exactly five ratings, each in `1..=10`.
//! Missing ratings default to 6 and missing commentary to fixed placeholders,
//! so a partial response still yields a complete report. When the call itself
//! fails the caller substitutes `ScoreReport::neutral()`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InferenceError;
use crate::extract::{self, RUBRIC_RATING};
use crate::inference::{GenerateOptions, InferenceBackend};
use crate::model::Item;
use crate::prompts;

pub const DEFAULT_STRENGTHS: &str = "Good Independence Day essay";
pub const DEFAULT_TOPICS: &str = "Independence Day themes";
pub const NEUTRAL_STRENGTHS: &str = "Independence Day themed essay";
pub const NEUTRAL_TOPICS: &str = "Independence Day celebrations";

/// Rubric dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Relevance,
    Content,
    Writing,
    Original,
    Impact,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Self::Relevance,
        Self::Content,
        Self::Writing,
        Self::Original,
        Self::Impact,
    ];

    /// Label the model is asked to emit.
    pub fn label(self) -> &'static str {
        match self {
            Self::Relevance => "Relevance",
            Self::Content => "Content",
            Self::Writing => "Writing",
            Self::Original => "Original",
            Self::Impact => "Impact",
        }
    }

    /// Human-readable name for reports.
    pub fn description(self) -> &'static str {
        match self {
            Self::Relevance => "Relevance to Independence Day",
            Self::Content => "Content Quality",
            Self::Writing => "Writing Quality",
            Self::Original => "Originality",
            Self::Impact => "Emotional Impact",
        }
    }
}

/// One rating per rubric dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
    pub relevance: u8,
    pub content: u8,
    pub writing: u8,
    pub original: u8,
    pub impact: u8,
}

impl Ratings {
    pub fn uniform(value: u8) -> Self {
        Self {
            relevance: value,
            content: value,
            writing: value,
            original: value,
            impact: value,
        }
    }

    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Relevance => self.relevance,
            Dimension::Content => self.content,
            Dimension::Writing => self.writing,
            Dimension::Original => self.original,
            Dimension::Impact => self.impact,
        }
    }

    fn set(&mut self, dimension: Dimension, value: u8) {
        match dimension {
            Dimension::Relevance => self.relevance = value,
            Dimension::Content => self.content = value,
            Dimension::Writing => self.writing = value,
            Dimension::Original => self.original = value,
            Dimension::Impact => self.impact = value,
        }
    }

    pub fn values(&self) -> [u8; 5] {
        Dimension::ALL.map(|d| self.get(d))
    }

    pub fn mean(&self) -> f64 {
        let values = self.values();
        values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
    }
}

/// Letter grade bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    /// Step function: ≥9 A+, ≥8 A, ≥7 B+, ≥6 B, ≥5 C+, otherwise C.
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::APlus
        } else if score >= 8.0 {
            Self::A
        } else if score >= 7.0 {
            Self::BPlus
        } else if score >= 6.0 {
            Self::B
        } else if score >= 5.0 {
            Self::CPlus
        } else {
            Self::C
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::CPlus => "C+",
            Self::C => "C",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a report's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Model,
    /// Substituted after the scoring call failed.
    NeutralDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub ratings: Ratings,
    pub aggregate_score: f64,
    pub grade: Grade,
    pub strengths: String,
    pub topics: String,
    pub source: ScoreSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl ScoreReport {
    /// Build a report whose aggregate and grade are derived from `ratings`.
    pub fn from_ratings(
        ratings: Ratings,
        strengths: impl Into<String>,
        topics: impl Into<String>,
        source: ScoreSource,
    ) -> Self {
        let aggregate_score = ratings.mean();
        Self {
            ratings,
            aggregate_score,
            grade: Grade::from_score(aggregate_score),
            strengths: strengths.into(),
            topics: topics.into(),
            source,
            raw_output: None,
        }
    }

    /// Stand-in for an item whose scoring call failed: all 6, grade B.
    pub fn neutral() -> Self {
        Self::from_ratings(
            Ratings::uniform(RUBRIC_RATING.default),
            NEUTRAL_STRENGTHS,
            NEUTRAL_TOPICS,
            ScoreSource::NeutralDefault,
        )
    }

    pub fn is_neutral_default(&self) -> bool {
        self.source == ScoreSource::NeutralDefault
    }
}

/// Parse a rubric response. Never fails; see module docs for defaults.
pub fn parse_report(output: &str) -> ScoreReport {
    let mut ratings = Ratings::uniform(RUBRIC_RATING.default);
    let mut defaulted = Vec::new();
    for dimension in Dimension::ALL {
        let extracted = extract::labeled_rating(output, dimension.label(), RUBRIC_RATING);
        if extracted.is_defaulted() {
            defaulted.push(dimension.label());
        }
        ratings.set(dimension, extracted.value());
    }

    let strengths = extract::section_text(output, "Strengths", DEFAULT_STRENGTHS);
    let topics = extract::section_text(output, "Topics", DEFAULT_TOPICS);
    if strengths.is_defaulted() {
        defaulted.push("Strengths");
    }
    if topics.is_defaulted() {
        defaulted.push("Topics");
    }
    if !defaulted.is_empty() {
        debug!(fields = ?defaulted, "rubric fields missing from response, defaults applied");
    }

    let mut report = ScoreReport::from_ratings(
        ratings,
        strengths.value(),
        topics.value(),
        ScoreSource::Model,
    );
    report.raw_output = Some(output.to_string());
    report
}

pub struct Scorer {
    backend: Arc<dyn InferenceBackend>,
    options: GenerateOptions,
}

impl Scorer {
    pub fn new(backend: Arc<dyn InferenceBackend>, options: GenerateOptions) -> Self {
        Self { backend, options }
    }

    /// Score one included item. The error is the call's failure; callers
    /// decide the fallback (the orchestrator uses `ScoreReport::neutral()`).
    pub async fn score(&self, item: &Item) -> Result<ScoreReport, InferenceError> {
        let prompt = prompts::rubric_prompt(&item.id, &item.raw_text);
        let output = self.backend.generate(&prompt, &self.options).await?;
        Ok(parse_report(&output))
    }
}
