//! Runtime configuration for a judging run.
//!
//! ## Call kinds
//!
//! | Call            | Temperature | top_p | Timeout |
//! |-----------------|-------------|-------|---------|
//! | classification  | 0.1         | 0.9   | 90 s    |
//! | scoring         | 0.1         | -     | 45 s    |
//! | zone judge      | 0.2         | -     | 60 s    |
//! | championship    | 0.3         | -     | 180 s   |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::inference::{duration_secs, GenerateOptions};

/// Essays per zone forwarded to the cross-zone comparison.
pub const DEFAULT_TOP_K: usize = 3;
/// Minimum gap between consecutive inference calls.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// Whether zone winners are compared against each other after ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionMode {
    SingleZone,
    MultiZone,
}

/// Decoding options for each kind of inference call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallProfile {
    pub classify: GenerateOptions,
    pub score: GenerateOptions,
    pub zone_judge: GenerateOptions,
    pub championship: GenerateOptions,
}

impl Default for CallProfile {
    fn default() -> Self {
        Self {
            classify: GenerateOptions::new(0.1, Duration::from_secs(90)).with_top_p(0.9),
            score: GenerateOptions::new(0.1, Duration::from_secs(45)),
            zone_judge: GenerateOptions::new(0.2, Duration::from_secs(60)),
            championship: GenerateOptions::new(0.3, Duration::from_secs(180)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgingConfig {
    pub top_k: usize,
    #[serde(with = "duration_secs")]
    pub pacing: Duration,
    pub calls: CallProfile,
    /// Ask for a comparative narrative inside each ranked zone.
    pub zone_narrative: bool,
}

impl Default for JudgingConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            pacing: DEFAULT_PACING,
            calls: CallProfile::default(),
            zone_narrative: true,
        }
    }
}

impl JudgingConfig {
    /// Validate the config; return an error string if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be > 0".to_string());
        }
        let calls = [
            ("classify", &self.calls.classify),
            ("score", &self.calls.score),
            ("zone_judge", &self.calls.zone_judge),
            ("championship", &self.calls.championship),
        ];
        for (name, opts) in calls {
            if !(0.0..=2.0).contains(&opts.temperature) {
                return Err(format!(
                    "{name} temperature must be in [0, 2], got {}",
                    opts.temperature
                ));
            }
            if let Some(top_p) = opts.top_p {
                if !(0.0..=1.0).contains(&top_p) {
                    return Err(format!("{name} top_p must be in [0, 1], got {top_p}"));
                }
            }
            if opts.timeout.is_zero() {
                return Err(format!("{name} timeout must be > 0"));
            }
        }
        if self.calls.score.timeout >= self.calls.classify.timeout {
            return Err("score timeout must be shorter than classify timeout".to_string());
        }
        if self.calls.championship.timeout <= self.calls.classify.timeout {
            return Err("championship timeout must be longer than per-item timeouts".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        JudgingConfig::default()
            .validate()
            .expect("default config should be valid");
    }

    #[test]
    fn zero_top_k_rejected() {
        let cfg = JudgingConfig {
            top_k: 0,
            ..JudgingConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn championship_must_outlast_item_calls() {
        let mut cfg = JudgingConfig::default();
        cfg.calls.championship.timeout = Duration::from_secs(30);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn invalid_top_p_rejected() {
        let mut cfg = JudgingConfig::default();
        cfg.calls.classify.top_p = Some(1.5);
        assert!(cfg.validate().is_err());
    }
}
