//! Contest configuration.
//!
//! Sources, lowest to highest precedence:
//!
//! | Source        | Example                                   |
//! |---------------|-------------------------------------------|
//! | built-in      | `ContestConfig::default()`                |
//! | TOML file     | `--config contest.toml`                   |
//! | environment   | `CONTEST_OLLAMA_URL`, `CONTEST_MODEL`, `CONTEST_PACING_MS` |
//! | CLI flags     | `--url`, `--model`, `--pacing-ms`, ...    |

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use judging::config::{DEFAULT_PACING, DEFAULT_TOP_K};
use judging::inference::{DEFAULT_BASE_URL, DEFAULT_HEALTH_TIMEOUT, DEFAULT_MODEL};
use judging::{CallProfile, EndpointConfig, JudgingConfig};
use serde::{Deserialize, Serialize};

use crate::cli::RunOptions;
use crate::error::ContestError;

pub const ENV_OLLAMA_URL: &str = "CONTEST_OLLAMA_URL";
pub const ENV_MODEL: &str = "CONTEST_MODEL";
pub const ENV_PACING_MS: &str = "CONTEST_PACING_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContestConfig {
    pub ollama_url: String,
    pub model: String,
    pub health_timeout_secs: u64,
    pub top_k: usize,
    pub pacing_ms: u64,
    pub zone_narrative: bool,
    /// Move off-topic essays into `<zone>/wrong_files/`.
    pub move_excluded: bool,
    /// Where the championship report directory is created.
    pub output_dir: PathBuf,
    pub calls: CallProfile,
}

impl Default for ContestConfig {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            health_timeout_secs: DEFAULT_HEALTH_TIMEOUT.as_secs(),
            top_k: DEFAULT_TOP_K,
            pacing_ms: DEFAULT_PACING.as_millis() as u64,
            zone_narrative: true,
            move_excluded: true,
            output_dir: PathBuf::from("."),
            calls: CallProfile::default(),
        }
    }
}

impl ContestConfig {
    /// Load a config from a TOML file. Missing keys take built-in defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        let config: ContestConfig =
            toml::from_str(&content).context("Failed to parse contest config TOML")?;
        Ok(config)
    }

    /// File (if given), then environment, then flags; validated.
    pub fn resolve(options: &RunOptions) -> Result<Self> {
        let mut config = match &options.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_options(options);
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ContestError> {
        if let Some(url) = lookup(ENV_OLLAMA_URL) {
            self.ollama_url = url;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.model = model;
        }
        if let Some(raw) = lookup(ENV_PACING_MS) {
            self.pacing_ms = raw.trim().parse().map_err(|_| {
                ContestError::Config(format!("{ENV_PACING_MS} must be an integer, got '{raw}'"))
            })?;
        }
        Ok(())
    }

    pub fn apply_options(&mut self, options: &RunOptions) {
        if let Some(url) = &options.url {
            self.ollama_url = url.clone();
        }
        if let Some(model) = &options.model {
            self.model = model.clone();
        }
        if let Some(top_k) = options.top_k {
            self.top_k = top_k;
        }
        if let Some(pacing_ms) = options.pacing_ms {
            self.pacing_ms = pacing_ms;
        }
        if let Some(dir) = &options.output_dir {
            self.output_dir = dir.clone();
        }
        if options.no_move {
            self.move_excluded = false;
        }
        if options.no_zone_narrative {
            self.zone_narrative = false;
        }
    }

    pub fn validate(&self) -> Result<(), ContestError> {
        if self.ollama_url.trim().is_empty() {
            return Err(ContestError::Config("ollama_url must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ContestError::Config("model must not be empty".to_string()));
        }
        if self.health_timeout_secs == 0 {
            return Err(ContestError::Config(
                "health_timeout_secs must be > 0".to_string(),
            ));
        }
        self.judging_config()
            .validate()
            .map_err(ContestError::Config)
    }

    pub fn endpoint(&self) -> EndpointConfig {
        EndpointConfig {
            base_url: self.ollama_url.clone(),
            model: self.model.clone(),
            health_timeout: Duration::from_secs(self.health_timeout_secs),
        }
    }

    pub fn judging_config(&self) -> JudgingConfig {
        JudgingConfig {
            top_k: self.top_k,
            pacing: Duration::from_millis(self.pacing_ms),
            calls: self.calls,
            zone_narrative: self.zone_narrative,
        }
    }
}
