//! Report rendering and the filesystem side effects that follow a run.
//!
//! ## Layout
//!
//! ```text
//! <zone folder>/
//!   wrong_files/                  off-topic essays (moved)
//!   essay_analysis/
//!     competition_results.md
//!     essay_scores.csv
//!     competition_results.json
//! <output dir>/
//!   multi_zone_championship_results/
//!     grand_championship_report.md
//! ```

use std::borrow::Cow;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use judging::{CompetitionResult, CrossZoneOutcome, Dimension, ZoneReport, ZoneResult};
use tracing::{info, warn};

use crate::error::ContestError;

pub const WRONG_FILES_DIR: &str = "wrong_files";
pub const ANALYSIS_DIR: &str = "essay_analysis";
pub const ZONE_REPORT_FILE: &str = "competition_results.md";
pub const SCORES_CSV_FILE: &str = "essay_scores.csv";
pub const ZONE_JSON_FILE: &str = "competition_results.json";
pub const CHAMPIONSHIP_DIR: &str = "multi_zone_championship_results";
pub const CHAMPIONSHIP_FILE: &str = "grand_championship_report.md";

/// Essays listed in the console summary.
const CONSOLE_TOP: usize = 5;
/// Characters of strengths shown per essay in the console summary.
const CONSOLE_STRENGTHS_CHARS: usize = 60;

// ── Zone report ──────────────────────────────────────────────────────────────

/// Markdown report for one zone.
pub fn zone_markdown(report: &ZoneReport) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# INDEPENDENCE DAY ESSAY COMPETITION RESULTS\n");
    let _ = writeln!(md, "**Zone:** {}\n", report.zone_name());
    let _ = writeln!(md, "## OVERVIEW");
    let _ = writeln!(md, "- Total submissions: {}", report.total_items);
    let _ = writeln!(md, "- Valid Independence Day essays: {}", report.ranking.len());
    let _ = writeln!(md, "- Disqualified (other topics): {}", report.excluded.len());
    let _ = writeln!(md, "- Classification errors: {}", report.errored.len());
    if report.scoring_failures > 0 {
        let _ = writeln!(
            md,
            "- Scored with neutral defaults: {}",
            report.scoring_failures
        );
    }
    if report.interrupted {
        let _ = writeln!(md, "- Run interrupted before all essays were judged");
    }
    md.push('\n');

    let _ = writeln!(md, "## ESSAY SCORES\n");
    for (i, entry) in report.ranking.ranked.iter().enumerate() {
        let r = &entry.report;
        let _ = writeln!(
            md,
            "### {}. {} - {:.1}/10 ({})\n",
            i + 1,
            entry.item.id,
            r.aggregate_score,
            r.grade
        );
        let _ = writeln!(md, "**Detailed Scores:**");
        for dimension in Dimension::ALL {
            let _ = writeln!(
                md,
                "- {}: {}/10",
                dimension.description(),
                r.ratings.get(dimension)
            );
        }
        md.push('\n');
        let _ = writeln!(md, "**Key Strengths:** {}\n", r.strengths);
        let _ = writeln!(md, "**Independence Day Topics:** {}\n", r.topics);
        let _ = writeln!(md, "---\n");
    }

    if let Some(narrative) = &report.narrative {
        let _ = writeln!(md, "## JUDGE'S FINAL RANKING\n");
        let _ = writeln!(md, "{}\n", narrative.text);
    }
    md
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Per-essay score table, best first.
pub fn scores_csv(result: &ZoneResult) -> String {
    let mut csv = String::from(
        "filename,overall_score,grade,relevance,content_quality,writing_quality,\
         originality,emotional_impact,strengths,topics_covered,word_count\n",
    );
    for entry in &result.ranked {
        let r = &entry.report;
        let [relevance, content, writing, original, impact] = r.ratings.values();
        let _ = writeln!(
            csv,
            "{},{:.1},{},{},{},{},{},{},{},{},{}",
            csv_field(&entry.item.id),
            r.aggregate_score,
            r.grade,
            relevance,
            content,
            writing,
            original,
            impact,
            csv_field(&r.strengths),
            csv_field(&r.topics),
            entry.item.word_count()
        );
    }
    csv
}

/// Paths written for one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneOutputs {
    pub markdown: PathBuf,
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// Write the markdown, CSV and JSON results into `<folder>/essay_analysis/`.
pub fn write_zone_outputs(folder: &Path, report: &ZoneReport) -> Result<ZoneOutputs, ContestError> {
    let dir = folder.join(ANALYSIS_DIR);
    fs::create_dir_all(&dir).map_err(|e| ContestError::io(&dir, e))?;

    let outputs = ZoneOutputs {
        markdown: dir.join(ZONE_REPORT_FILE),
        csv: dir.join(SCORES_CSV_FILE),
        json: dir.join(ZONE_JSON_FILE),
    };
    write_file(&outputs.markdown, &zone_markdown(report))?;
    write_file(&outputs.csv, &scores_csv(&report.ranking))?;
    write_file(&outputs.json, &serde_json::to_string_pretty(report)?)?;

    info!(zone = %report.zone_name(), dir = %dir.display(), "zone results saved");
    Ok(outputs)
}

/// Move every excluded essay into `<folder>/wrong_files/`. A failed move is
/// logged and the essay stays where it is. Returns the new paths.
pub fn relocate_excluded(folder: &Path, report: &ZoneReport) -> Vec<PathBuf> {
    if report.excluded.is_empty() {
        return Vec::new();
    }
    let dir = folder.join(WRONG_FILES_DIR);
    if let Err(e) = fs::create_dir_all(&dir) {
        warn!(dir = %dir.display(), error = %e, "cannot create wrong_files folder");
        return Vec::new();
    }

    let mut moved = Vec::new();
    for entry in &report.excluded {
        let source = &entry.item.source;
        let Some(name) = source.file_name() else {
            continue;
        };
        let destination = dir.join(name);
        match fs::rename(source, &destination) {
            Ok(()) => {
                info!(item = %entry.item.id, to = %destination.display(), "moved off-topic essay");
                moved.push(destination);
            }
            Err(e) => warn!(item = %entry.item.id, error = %e, "move failed"),
        }
    }
    moved
}

/// Plain-text summary printed after a zone finishes.
pub fn console_summary(report: &ZoneReport) -> String {
    let mut out = String::new();
    let ranking = &report.ranking;
    let _ = writeln!(out, "FINAL RESULTS: {}", report.zone_name());
    let (Some(mean), Some((low, high))) = (ranking.mean_score(), ranking.score_range()) else {
        let _ = writeln!(out, "No Independence Day essays found.");
        return out;
    };

    let _ = writeln!(out, "Valid Entries: {} essays", ranking.len());
    let _ = writeln!(out, "Average Score: {mean:.2}/10");
    let _ = writeln!(out, "Top Score: {high:.2}/10");
    let _ = writeln!(out, "Score Range: {low:.2} - {high:.2}");
    let _ = writeln!(out, "\nTOP {} ESSAYS:", CONSOLE_TOP.min(ranking.len()));
    for (rank, entry) in ranking.top_k(CONSOLE_TOP).ranked_entries() {
        let strengths: String = entry
            .report
            .strengths
            .chars()
            .take(CONSOLE_STRENGTHS_CHARS)
            .collect();
        let _ = writeln!(out, "  {rank}. {}", entry.item.id);
        let _ = writeln!(
            out,
            "     Score: {:.1}/10 ({}) - {strengths}...",
            entry.report.aggregate_score, entry.report.grade
        );
    }
    out
}

// ── Championship report ──────────────────────────────────────────────────────

/// Markdown report for a multi-zone run.
pub fn championship_markdown(result: &CompetitionResult, top_k: usize, date: DateTime<Local>) -> String {
    let top = result.top_k(top_k);
    let zones = top.iter().filter(|t| !t.is_empty()).count();
    let essays: usize = top.iter().map(|t| t.len()).sum();

    let mut md = String::new();
    let _ = writeln!(md, "# MULTI-ZONE INDEPENDENCE DAY ESSAY CHAMPIONSHIP\n");
    let _ = writeln!(md, "**Competition Date:** {}\n", date.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(md, "**Participating Zones:** {zones}");
    let _ = writeln!(md, "**Total Essays Compared:** {essays}\n");

    let _ = writeln!(md, "## ZONE QUALIFIERS\n");
    for zone in &top {
        if zone.is_empty() {
            let _ = writeln!(md, "- {}: no qualifying essays", zone.zone_name);
            continue;
        }
        for (rank, entry) in zone.ranked_entries() {
            let _ = writeln!(
                md,
                "- {} #{rank}: {} - {:.1}/10 ({})",
                zone.zone_name, entry.item.id, entry.report.aggregate_score, entry.report.grade
            );
        }
    }
    md.push('\n');

    let _ = writeln!(md, "## GRAND CHAMPIONSHIP RESULTS\n");
    match &result.cross_zone {
        CrossZoneOutcome::Reported(narrative) => {
            let _ = writeln!(md, "{}", narrative.text);
        }
        CrossZoneOutcome::Skipped { reason } => {
            let _ = writeln!(md, "Grand comparison skipped: {reason}");
        }
        CrossZoneOutcome::NotRequested => {
            let _ = writeln!(md, "Grand comparison not requested.");
        }
    }
    md
}

/// Write the championship report under `<output_dir>/multi_zone_championship_results/`.
pub fn write_championship(
    output_dir: &Path,
    result: &CompetitionResult,
    top_k: usize,
    date: DateTime<Local>,
) -> Result<PathBuf, ContestError> {
    let dir = output_dir.join(CHAMPIONSHIP_DIR);
    fs::create_dir_all(&dir).map_err(|e| ContestError::io(&dir, e))?;
    let path = dir.join(CHAMPIONSHIP_FILE);
    write_file(&path, &championship_markdown(result, top_k, date))?;
    info!(path = %path.display(), "championship report saved");
    Ok(path)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ContestError> {
    fs::write(path, contents).map_err(|e| ContestError::io(path, e))
}
