//! Drives a judging run: classify → score → rank per zone, then compare zones.
//!
//! ## Lifecycle
//!
//! ```text
//! Orchestrator::run(mode, zones)
//!   → health probe                       (abort run if unreachable)
//!   → for each zone:
//!       classify every item              (Error / Excluded items set aside)
//!       score every Included item        (failed call → neutral report)
//!       rank                             (stable, best first)
//!       zone narrative                   (optional)
//!   → multi-zone: cross-zone comparison  (failure affects only this phase)
//! ```
//!
//! All inference goes through one `PacedBackend`, so calls are strictly
//! sequential and spaced by the configured pacing delay. Cancellation is
//! checked between items; an in-flight call always completes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::aggregator::{CrossZoneAggregator, Narrative, ZoneJudge};
use crate::classifier::Classifier;
use crate::config::{CompetitionMode, JudgingConfig};
use crate::error::{JudgingError, JudgingResult};
use crate::inference::InferenceBackend;
use crate::model::{ClassificationResult, ClassifiedItem, Item, Verdict};
use crate::pacing::PacedBackend;
use crate::ranking::{rank, ScoredItem, ZoneResult, ZoneTopK};
use crate::scorer::{ScoreReport, Scorer};

/// Items of one zone, in intake order.
#[derive(Debug, Clone)]
pub struct ZoneInput {
    pub zone_name: String,
    pub items: Vec<Item>,
}

impl ZoneInput {
    pub fn new(zone_name: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            zone_name: zone_name.into(),
            items,
        }
    }
}

/// Everything produced for one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneReport {
    pub ranking: ZoneResult,
    /// Classification of every included item, in intake order.
    pub included: Vec<ClassifiedItem>,
    pub excluded: Vec<ClassifiedItem>,
    pub errored: Vec<ClassifiedItem>,
    /// Included items whose scoring call failed and got the neutral report.
    pub scoring_failures: usize,
    pub narrative: Option<Narrative>,
    /// Items handed in, including any not reached before an interrupt.
    pub total_items: usize,
    pub interrupted: bool,
}

impl ZoneReport {
    pub fn zone_name(&self) -> &str {
        &self.ranking.zone_name
    }

    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }
}

/// What happened to the cross-zone phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CrossZoneOutcome {
    /// Single-zone run.
    NotRequested,
    /// Precondition failed or the run was interrupted; zone results stand.
    Skipped { reason: String },
    Reported(Narrative),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionResult {
    pub mode: CompetitionMode,
    pub zones: Vec<ZoneReport>,
    pub cross_zone: CrossZoneOutcome,
    pub interrupted: bool,
}

impl CompetitionResult {
    pub fn cross_zone_narrative(&self) -> Option<&str> {
        match &self.cross_zone {
            CrossZoneOutcome::Reported(n) => Some(n.text.as_str()),
            _ => None,
        }
    }

    pub fn top_k(&self, k: usize) -> Vec<ZoneTopK<'_>> {
        self.zones.iter().map(|z| z.ranking.top_k(k)).collect()
    }
}

/// Progress callbacks. Every method has a no-op default.
pub trait PipelineObserver: Send + Sync {
    fn zone_started(&self, _zone: &str, _items: usize) {}
    fn item_classified(&self, _item: &Item, _result: &ClassificationResult) {}
    fn item_scored(&self, _item: &Item, _report: &ScoreReport) {}
    fn zone_skipped(&self, _error: &JudgingError) {}
    fn zone_ranked(&self, _report: &ZoneReport) {}
    fn cross_zone_started(&self, _zones: usize, _candidates: usize) {}
}

/// Observer that does nothing.
pub struct SilentObserver;

impl PipelineObserver for SilentObserver {}

pub struct Orchestrator {
    config: JudgingConfig,
    backend: Arc<dyn InferenceBackend>,
    classifier: Classifier,
    scorer: Scorer,
    zone_judge: ZoneJudge,
    aggregator: CrossZoneAggregator,
    observer: Arc<dyn PipelineObserver>,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Wrap `backend` in pacing and build every component on top of it.
    pub fn new(config: JudgingConfig, backend: Arc<dyn InferenceBackend>) -> JudgingResult<Self> {
        config.validate().map_err(JudgingError::Configuration)?;

        let paced: Arc<dyn InferenceBackend> = Arc::new(PacedBackend::new(backend, config.pacing));
        Ok(Self {
            classifier: Classifier::new(paced.clone(), config.calls.classify),
            scorer: Scorer::new(paced.clone(), config.calls.score),
            zone_judge: ZoneJudge::new(paced.clone(), config.calls.zone_judge),
            aggregator: CrossZoneAggregator::new(paced.clone(), config.calls.championship),
            backend: paced,
            config,
            observer: Arc::new(SilentObserver),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &JudgingConfig {
        &self.config
    }

    /// Judge every zone, then (multi-zone mode) compare their best essays.
    ///
    /// Fails only when the inference service is unreachable up front or the
    /// mode does not match the number of zones.
    pub async fn run(
        &self,
        mode: CompetitionMode,
        zones: Vec<ZoneInput>,
    ) -> JudgingResult<CompetitionResult> {
        match mode {
            CompetitionMode::SingleZone if zones.len() != 1 => {
                return Err(JudgingError::Configuration(format!(
                    "single-zone mode takes exactly one zone, got {}",
                    zones.len()
                )));
            }
            CompetitionMode::MultiZone if zones.len() < 2 => {
                return Err(JudgingError::Configuration(format!(
                    "multi-zone mode needs at least two zones, got {}",
                    zones.len()
                )));
            }
            _ => {}
        }

        if !self.backend.health_check().await {
            return Err(JudgingError::ServiceUnavailable(
                "health probe failed".to_string(),
            ));
        }

        let mut reports = Vec::with_capacity(zones.len());
        let mut interrupted = false;
        for zone in zones {
            if self.cancel.is_cancelled() {
                interrupted = true;
                break;
            }
            let report = self.judge_zone(zone).await;
            interrupted = report.interrupted;
            reports.push(report);
            if interrupted {
                break;
            }
        }

        let cross_zone = match mode {
            CompetitionMode::SingleZone => CrossZoneOutcome::NotRequested,
            CompetitionMode::MultiZone if interrupted => CrossZoneOutcome::Skipped {
                reason: JudgingError::Cancelled.to_string(),
            },
            CompetitionMode::MultiZone => self.compare_zones(&reports).await,
        };

        Ok(CompetitionResult {
            mode,
            zones: reports,
            cross_zone,
            interrupted,
        })
    }

    /// Classify, score and rank one zone. Never fails; per-item failures are
    /// folded into the report.
    pub async fn judge_zone(&self, zone: ZoneInput) -> ZoneReport {
        let ZoneInput { zone_name, items } = zone;
        let total_items = items.len();
        info!(zone = %zone_name, items = total_items, "judging zone");
        self.observer.zone_started(&zone_name, total_items);

        let mut included = Vec::new();
        let mut excluded = Vec::new();
        let mut errored = Vec::new();
        let mut interrupted = false;

        for item in items {
            if self.cancel.is_cancelled() {
                interrupted = true;
                break;
            }
            let classification = self.classifier.classify(&item).await;
            self.observer.item_classified(&item, &classification);
            let entry = ClassifiedItem {
                item,
                classification,
            };
            match entry.classification.verdict {
                Verdict::Included => included.push(entry),
                Verdict::Excluded => excluded.push(entry),
                Verdict::Error => errored.push(entry),
            }
        }

        info!(
            zone = %zone_name,
            included = included.len(),
            excluded = excluded.len(),
            errors = errored.len(),
            "classification complete"
        );

        let mut report = ZoneReport {
            ranking: ZoneResult::empty(zone_name.clone()),
            included: Vec::new(),
            excluded,
            errored,
            scoring_failures: 0,
            narrative: None,
            total_items,
            interrupted,
        };

        if included.is_empty() {
            let err = JudgingError::NoQualifyingItems { zone: zone_name };
            warn!(error = %err, "skipping scoring and ranking");
            self.observer.zone_skipped(&err);
            return report;
        }

        let mut scored = Vec::with_capacity(included.len());
        for entry in &included {
            if self.cancel.is_cancelled() {
                report.interrupted = true;
                break;
            }
            let item = &entry.item;
            let result = match self.scorer.score(item).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(item = %item.id, zone = %zone_name, error = %e, "scoring failed, using neutral default");
                    report.scoring_failures += 1;
                    ScoreReport::neutral()
                }
            };
            self.observer.item_scored(item, &result);
            scored.push(ScoredItem::new(item.clone(), result));
        }

        report.ranking = rank(zone_name, scored);
        report.included = included;

        if self.config.zone_narrative && !report.interrupted {
            report.narrative = self.zone_judge.judge(&report.ranking).await;
        }

        self.observer.zone_ranked(&report);
        report
    }

    async fn compare_zones(&self, reports: &[ZoneReport]) -> CrossZoneOutcome {
        let top: Vec<ZoneTopK<'_>> = reports
            .iter()
            .map(|r| r.ranking.top_k(self.config.top_k))
            .collect();
        let non_empty: Vec<&ZoneTopK<'_>> = top.iter().filter(|t| !t.is_empty()).collect();
        self.observer.cross_zone_started(
            non_empty.len(),
            non_empty.iter().map(|t| t.len()).sum(),
        );

        match self.aggregator.aggregate(&top).await {
            Ok(narrative) => CrossZoneOutcome::Reported(narrative),
            Err(e) => {
                warn!(error = %e, "cross-zone comparison skipped");
                CrossZoneOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        }
    }
}
