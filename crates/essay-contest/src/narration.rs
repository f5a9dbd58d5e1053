//! Progress narration for the command line, emitted as tracing events.

use std::sync::atomic::{AtomicUsize, Ordering};

use judging::{ClassificationResult, Item, JudgingError, PipelineObserver, ScoreReport, Verdict, ZoneReport};
use tracing::{info, warn};

/// Characters of model output echoed per classification.
const RESPONSE_PREVIEW_CHARS: usize = 100;

/// Logs each pipeline step with a running `n/total` position.
#[derive(Default)]
pub struct ConsoleNarrator {
    total: AtomicUsize,
    classified: AtomicUsize,
    scored: AtomicUsize,
}

impl ConsoleNarrator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PipelineObserver for ConsoleNarrator {
    fn zone_started(&self, zone: &str, items: usize) {
        self.total.store(items, Ordering::Relaxed);
        self.classified.store(0, Ordering::Relaxed);
        self.scored.store(0, Ordering::Relaxed);
        info!(zone, items, "phase 1: classification");
    }

    fn item_classified(&self, item: &Item, result: &ClassificationResult) {
        let n = self.classified.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        let preview: String = result.raw_output.chars().take(RESPONSE_PREVIEW_CHARS).collect();
        match result.verdict {
            Verdict::Error => warn!(
                progress = %format!("{n}/{total}"),
                item = %item.id,
                error = %result.raw_output,
                "classification error"
            ),
            verdict => info!(
                progress = %format!("{n}/{total}"),
                item = %item.id,
                %verdict,
                score = ?result.model_score,
                overridden = result.overridden,
                response = %preview,
                "classified"
            ),
        }
    }

    fn item_scored(&self, item: &Item, report: &ScoreReport) {
        let n = self.scored.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            n,
            item = %item.id,
            score = %format!("{:.1}", report.aggregate_score),
            grade = %report.grade,
            neutral = report.is_neutral_default(),
            "scored"
        );
    }

    fn zone_skipped(&self, error: &JudgingError) {
        warn!(%error, "zone has nothing to rank");
    }

    fn zone_ranked(&self, report: &ZoneReport) {
        info!(
            zone = %report.zone_name(),
            ranked = report.ranking.len(),
            winner = report.ranking.ranked.first().map(|e| e.item.id.as_str()).unwrap_or("-"),
            "zone ranked"
        );
    }

    fn cross_zone_started(&self, zones: usize, candidates: usize) {
        info!(zones, candidates, "grand comparison phase");
    }
}
