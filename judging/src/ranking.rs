//! Zone ranking and top-K selection.
//!
//! Pure functions over owned results: `rank` consumes the scored items of one
//! zone and returns them ordered; `ZoneResult::top_k` hands out a borrowed
//! view, never a copy.

use serde::{Deserialize, Serialize};

use crate::model::Item;
use crate::scorer::ScoreReport;

/// An included item with its rubric report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: Item,
    pub report: ScoreReport,
}

impl ScoredItem {
    pub fn new(item: Item, report: ScoreReport) -> Self {
        Self { item, report }
    }

    pub fn aggregate_score(&self) -> f64 {
        self.report.aggregate_score
    }
}

/// One zone's scored items, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneResult {
    pub zone_name: String,
    pub ranked: Vec<ScoredItem>,
}

impl ZoneResult {
    pub fn empty(zone_name: impl Into<String>) -> Self {
        Self {
            zone_name: zone_name.into(),
            ranked: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// The first `k` entries (fewer if the zone is smaller).
    pub fn top_k(&self, k: usize) -> ZoneTopK<'_> {
        let end = k.min(self.ranked.len());
        ZoneTopK {
            zone_name: &self.zone_name,
            entries: &self.ranked[..end],
        }
    }

    pub fn mean_score(&self) -> Option<f64> {
        if self.ranked.is_empty() {
            return None;
        }
        let total: f64 = self.ranked.iter().map(ScoredItem::aggregate_score).sum();
        Some(total / self.ranked.len() as f64)
    }

    /// (lowest, highest) aggregate score.
    pub fn score_range(&self) -> Option<(f64, f64)> {
        let first = self.ranked.first()?.aggregate_score();
        let last = self.ranked.last()?.aggregate_score();
        Some((last, first))
    }
}

/// Read-only view of a zone's best entries, forwarded to cross-zone comparison.
#[derive(Debug, Clone, Copy)]
pub struct ZoneTopK<'a> {
    pub zone_name: &'a str,
    pub entries: &'a [ScoredItem],
}

impl<'a> ZoneTopK<'a> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries with their 1-based zone rank.
    pub fn ranked_entries(&self) -> impl Iterator<Item = (usize, &'a ScoredItem)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }
}

/// Order `scored` by aggregate score, highest first. Equal scores keep their
/// input order.
pub fn rank(zone_name: impl Into<String>, mut scored: Vec<ScoredItem>) -> ZoneResult {
    // `sort_by` is stable.
    scored.sort_by(|a, b| b.aggregate_score().total_cmp(&a.aggregate_score()));
    ZoneResult {
        zone_name: zone_name.into(),
        ranked: scored,
    }
}
