//! Comparative narratives: the cross-zone championship and the per-zone judge.
//!
//! Both ask the model for a free-form ranking that is stored as-is; neither
//! output is parsed further. A failed call produces placeholder text with
//! `NarrativeStatus::Unavailable` so already-computed rankings stay valid.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{JudgingError, JudgingResult};
use crate::extract::truncate_chars;
use crate::inference::{GenerateOptions, InferenceBackend};
use crate::prompts;
use crate::ranking::{ZoneResult, ZoneTopK};

/// Cross-zone comparison needs at least this many non-empty zones.
pub const MIN_ZONES_FOR_COMPARISON: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeStatus {
    Completed,
    /// The call failed; `text` is a placeholder naming the failure.
    Unavailable,
}

/// Opaque model-written ranking plus what it covered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub text: String,
    pub status: NarrativeStatus,
    /// Zones represented in the prompt, in prompt order.
    pub zones: Vec<String>,
    pub candidate_count: usize,
}

impl Narrative {
    pub fn is_completed(&self) -> bool {
        self.status == NarrativeStatus::Completed
    }
}

/// Candidate listing for the championship prompt. Empty zones are skipped;
/// candidates are numbered across zones.
pub fn candidate_listing(zones: &[ZoneTopK<'_>]) -> String {
    let mut listing = String::new();
    let mut number = 0;
    for zone in zones.iter().filter(|z| !z.is_empty()) {
        let _ = writeln!(listing, "\n=== {} Top Essays ===", zone.zone_name);
        for (rank, entry) in zone.ranked_entries() {
            number += 1;
            let _ = writeln!(
                listing,
                "\nEssay {number}: {} (from {})",
                entry.item.id, zone.zone_name
            );
            let _ = writeln!(
                listing,
                "Zone Rank: #{rank}, Zone Score: {:.1}/10",
                entry.report.aggregate_score
            );
            let _ = writeln!(listing, "Strengths: {}", entry.report.strengths);
            let _ = writeln!(
                listing,
                "Content Preview: {}...",
                truncate_chars(&entry.item.raw_text, prompts::CANDIDATE_PREVIEW_CHARS)
            );
        }
    }
    listing
}

/// Compares the best essays of every non-empty zone in a single call.
pub struct CrossZoneAggregator {
    backend: Arc<dyn InferenceBackend>,
    options: GenerateOptions,
}

impl CrossZoneAggregator {
    pub fn new(backend: Arc<dyn InferenceBackend>, options: GenerateOptions) -> Self {
        Self { backend, options }
    }

    /// Request the championship narrative.
    ///
    /// Fails only with `InsufficientZones`, before any call is made. A failed
    /// call still returns `Ok` with an `Unavailable` placeholder.
    pub async fn aggregate(&self, zones: &[ZoneTopK<'_>]) -> JudgingResult<Narrative> {
        let surviving: Vec<ZoneTopK<'_>> = zones.iter().copied().filter(|z| !z.is_empty()).collect();
        if surviving.len() < MIN_ZONES_FOR_COMPARISON {
            return Err(JudgingError::InsufficientZones {
                found: surviving.len(),
                required: MIN_ZONES_FOR_COMPARISON,
            });
        }

        let candidate_count: usize = surviving.iter().map(ZoneTopK::len).sum();
        let zone_names: Vec<String> = surviving.iter().map(|z| z.zone_name.to_string()).collect();
        info!(
            zones = surviving.len(),
            candidates = candidate_count,
            "requesting cross-zone comparison"
        );

        let prompt = prompts::championship_prompt(&candidate_listing(&surviving));
        let (text, status) = match self.backend.generate(&prompt, &self.options).await {
            Ok(text) => (text, NarrativeStatus::Completed),
            Err(e) => {
                warn!(error = %e, "cross-zone comparison failed");
                (
                    format!("Error in grand comparison: {e}"),
                    NarrativeStatus::Unavailable,
                )
            }
        };

        Ok(Narrative {
            text,
            status,
            zones: zone_names,
            candidate_count,
        })
    }
}

/// One summary line per essay for the zone judge prompt.
pub fn zone_summary(result: &ZoneResult) -> String {
    result
        .ranked
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "{}. {} - Score: {:.1}/10 - Strengths: {}...",
                i + 1,
                entry.item.id,
                entry.report.aggregate_score,
                truncate_chars(&entry.report.strengths, prompts::ZONE_SUMMARY_STRENGTHS_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Asks for a brief best-to-worst ranking of one zone's essays.
pub struct ZoneJudge {
    backend: Arc<dyn InferenceBackend>,
    options: GenerateOptions,
}

impl ZoneJudge {
    pub fn new(backend: Arc<dyn InferenceBackend>, options: GenerateOptions) -> Self {
        Self { backend, options }
    }

    /// `None` for an empty zone; otherwise a narrative, possibly `Unavailable`.
    pub async fn judge(&self, result: &ZoneResult) -> Option<Narrative> {
        if result.is_empty() {
            return None;
        }

        let prompt = prompts::zone_judge_prompt(result.len(), &zone_summary(result));
        let (text, status) = match self.backend.generate(&prompt, &self.options).await {
            Ok(text) => (text, NarrativeStatus::Completed),
            Err(e) => {
                warn!(zone = %result.zone_name, error = %e, "zone ranking narrative failed");
                (
                    format!("Ranking analysis failed: {e}"),
                    NarrativeStatus::Unavailable,
                )
            }
        };

        Some(Narrative {
            text,
            status,
            zones: vec![result.zone_name.clone()],
            candidate_count: result.len(),
        })
    }
}
