//! Essay competition command line, built on the `judging` library.
//!
//! Adds what the library leaves to its embedder: folder intake, layered
//! configuration, progress narration, and the markdown/CSV/JSON reports.

pub mod cli;
pub mod config;
pub mod error;
pub mod intake;
pub mod narration;
pub mod report;

pub use error::ContestError;
