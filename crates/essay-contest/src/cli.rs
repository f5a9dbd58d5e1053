//! Command-line interface.
//!
//! ```bash
//! # One folder
//! essay-contest single ./essays/north
//!
//! # Several zones, winners compared
//! essay-contest multi --zone North=./essays/north --zone South=./essays/south
//!
//! # Models offered by the endpoint
//! essay-contest models
//! ```

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use judging::CompetitionMode;

use crate::error::ContestError;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: RunOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides applied on top of the config file and environment.
#[derive(Args, Debug, Default, Clone)]
pub struct RunOptions {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ollama base URL (overrides CONTEST_OLLAMA_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Model name (overrides CONTEST_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Essays per zone forwarded to the championship round
    #[arg(long, global = true)]
    pub top_k: Option<usize>,

    /// Delay between inference calls in milliseconds (overrides CONTEST_PACING_MS)
    #[arg(long, global = true)]
    pub pacing_ms: Option<u64>,

    /// Leave off-topic essays in place instead of moving them to wrong_files/
    #[arg(long, global = true, default_value_t = false)]
    pub no_move: bool,

    /// Directory for the multi-zone championship report
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Skip the per-zone judge narrative
    #[arg(long, global = true, default_value_t = false)]
    pub no_zone_narrative: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Judge a single folder of essays
    Single {
        folder: PathBuf,

        /// Zone name used in reports (defaults to the folder name)
        #[arg(long)]
        zone_name: Option<String>,
    },

    /// Judge several zones, then compare their best essays
    Multi {
        /// Zone as NAME=PATH; repeat for each zone (at least two)
        #[arg(long = "zone", value_parser = parse_zone, required = true)]
        zones: Vec<ZoneSpec>,
    },

    /// List the models the inference service offers
    Models,
}

/// One zone named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSpec {
    pub name: String,
    pub folder: PathBuf,
}

/// Parse `NAME=PATH`.
pub fn parse_zone(s: &str) -> Result<ZoneSpec, String> {
    let (name, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got '{s}'"))?;
    let name = name.trim();
    let path = path.trim();
    if name.is_empty() {
        return Err(format!("zone name is empty in '{s}'"));
    }
    if path.is_empty() {
        return Err(format!("zone path is empty in '{s}'"));
    }
    Ok(ZoneSpec {
        name: name.to_string(),
        folder: PathBuf::from(path),
    })
}

/// Display name for a folder given without an explicit zone name.
fn folder_zone_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Zone 1".to_string())
}

impl Command {
    /// Competition mode and zones to judge. `None` for `models`.
    pub fn competition(&self) -> Result<Option<(CompetitionMode, Vec<ZoneSpec>)>, ContestError> {
        match self {
            Self::Single { folder, zone_name } => {
                let name = zone_name
                    .clone()
                    .unwrap_or_else(|| folder_zone_name(folder));
                Ok(Some((
                    CompetitionMode::SingleZone,
                    vec![ZoneSpec {
                        name,
                        folder: folder.clone(),
                    }],
                )))
            }
            Self::Multi { zones } => {
                if zones.len() < 2 {
                    return Err(ContestError::Config(format!(
                        "multi-zone mode needs at least two --zone arguments, got {}",
                        zones.len()
                    )));
                }
                Ok(Some((CompetitionMode::MultiZone, zones.clone())))
            }
            Self::Models => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_zone_splits_on_first_equals() {
        let spec = parse_zone("North=./essays/a=b").unwrap();
        assert_eq!(spec.name, "North");
        assert_eq!(spec.folder, PathBuf::from("./essays/a=b"));
    }

    #[test]
    fn parse_zone_rejects_missing_parts() {
        assert!(parse_zone("North").is_err());
        assert!(parse_zone("=./x").is_err());
        assert!(parse_zone("North=").is_err());
    }

    #[test]
    fn multi_requires_two_zones() {
        let cli = Cli::try_parse_from(["essay-contest", "multi", "--zone", "A=./a"]).unwrap();
        assert!(cli.command.competition().is_err());

        let cli = Cli::try_parse_from([
            "essay-contest",
            "multi",
            "--zone",
            "A=./a",
            "--zone",
            "B=./b",
        ])
        .unwrap();
        let (mode, zones) = cli.command.competition().unwrap().unwrap();
        assert_eq!(mode, CompetitionMode::MultiZone);
        assert_eq!(zones.len(), 2);
    }

    #[test]
    fn single_defaults_zone_name_to_folder() {
        let cli = Cli::try_parse_from(["essay-contest", "single", "/tmp/essays/north"]).unwrap();
        let (mode, zones) = cli.command.competition().unwrap().unwrap();
        assert_eq!(mode, CompetitionMode::SingleZone);
        assert_eq!(zones[0].name, "north");
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "essay-contest",
            "single",
            "./essays",
            "--pacing-ms",
            "250",
            "--no-move",
        ])
        .unwrap();
        assert_eq!(cli.options.pacing_ms, Some(250));
        assert!(cli.options.no_move);
        assert!(!cli.options.no_zone_narrative);
    }
}
