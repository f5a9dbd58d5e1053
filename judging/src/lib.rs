//! Essay contest judging library.
//!
//! This library provides:
//! - An Ollama client behind the `InferenceBackend` trait, with call pacing
//! - Topic classification with a deterministic keyword fallback
//! - Five-dimension rubric scoring with per-field defaults
//! - Stable zone ranking and a cross-zone championship comparison
//! - An orchestrator sequencing all of the above with per-item failure isolation
//!
//! # Pipeline
//!
//! ```text
//! items ─► Classifier ─► {Included, Excluded, Error}
//!                            │
//!                            ▼
//!                         Scorer ─► rank ─► top-K per zone ─► CrossZoneAggregator
//! ```
//!
//! Filesystem intake, report rendering and the command line live in the
//! `essay-contest` crate.

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod error;
pub mod extract;
pub mod inference;
pub mod model;
pub mod orchestrator;
pub mod pacing;
pub mod prompts;
pub mod ranking;
pub mod scorer;

pub use aggregator::{CrossZoneAggregator, Narrative, NarrativeStatus, ZoneJudge};
pub use classifier::Classifier;
pub use config::{CallProfile, CompetitionMode, JudgingConfig};
pub use error::{InferenceError, JudgingError, JudgingResult};
pub use inference::{EndpointConfig, GenerateOptions, InferenceBackend, InferenceClient};
pub use model::{ClassificationResult, ClassifiedItem, Item, KeywordTally, Verdict};
pub use orchestrator::{
    CompetitionResult, CrossZoneOutcome, Orchestrator, PipelineObserver, SilentObserver,
    ZoneInput, ZoneReport,
};
pub use pacing::PacedBackend;
pub use prompts::PROMPT_VERSION;
pub use ranking::{rank, ScoredItem, ZoneResult, ZoneTopK};
pub use scorer::{Dimension, Grade, Ratings, ScoreReport, ScoreSource, Scorer};
