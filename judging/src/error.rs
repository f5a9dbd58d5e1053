//! Error taxonomy for the judging pipeline.
//!
//! Two layers:
//!
//! | Type             | Scope               | Who handles it                                  |
//! |------------------|---------------------|-------------------------------------------------|
//! | `InferenceError` | one inference call  | the calling component (exclude / default / placeholder) |
//! | `JudgingError`   | one phase of a run  | the orchestrator or the embedding application   |
//!
//! Parse failures of model output never appear here: every extracted field has
//! a default (see `crate::extract`), so a malformed response is not an error.

use thiserror::Error;

/// Outcome of a single failed call to the inference service.
///
/// Calls are attempted exactly once; neither variant is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// Connection refused, DNS failure, or the per-call timeout elapsed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered, but with a non-success status or without the
    /// expected completion field.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl InferenceError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_status() {
            Self::Protocol(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Run-level failures. Each one aborts at most the phase it names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JudgingError {
    /// The pre-run health probe failed; nothing was judged.
    #[error("inference service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Fewer non-empty zones than cross-zone aggregation needs.
    #[error("cross-zone comparison needs {required} zones with qualifying essays, found {found}")]
    InsufficientZones { found: usize, required: usize },

    /// No item in the zone passed classification; scoring and ranking were skipped.
    #[error("zone '{zone}' has no essays on topic")]
    NoQualifyingItems { zone: String },

    /// The configuration handed to the orchestrator is inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An interrupt arrived between items.
    #[error("run cancelled")]
    Cancelled,
}

pub type JudgingResult<T> = Result<T, JudgingError>;
