//! Error taxonomy shared by every pipeline step.
//!
//! Drivers in [`crate::pipeline`] turn each variant into a per-unit entry of
//! the [`crate::report::RunReport`]; only failures outside a unit of work
//! (an unreadable configuration file, for instance) abort a whole run.

use std::path::PathBuf;

/// Result alias for fallible `binsplit-core` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced by the partitioning, chunking and aggregation steps.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value is missing, unknown or out of range.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An artifact already exists and overwrite was not requested.
    #[error("artifact already exists: {} (rerun with overwrite to replace it)", path.display())]
    ArtifactConflict {
        /// Path of the existing artifact.
        path: PathBuf,
    },

    /// An artifact needed by this step has not been produced yet.
    #[error("missing prerequisite: {what} not found at {}", path.display())]
    MissingPrerequisite {
        /// Human-readable description of the missing artifact.
        what: String,
        /// Path where the artifact was expected.
        path: PathBuf,
    },

    /// Fewer result records were parsed than the partition has bins.
    #[error("incomplete result for {name}: expected {expected} bins, found {found}")]
    IncompleteResult {
        /// Combination name.
        name: String,
        /// Bin count of the persisted partition.
        expected: usize,
        /// Number of records recovered from the logs.
        found: usize,
    },

    /// A log line could not be parsed.
    #[error("malformed log line {line} in {}: {reason}", path.display())]
    MalformedLogLine {
        /// Log file containing the line.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// Two records in one collection run report the same bin.
    #[error("duplicate result for bin {bin} in {name}")]
    DuplicateBin {
        /// Combination name.
        name: String,
        /// Repeated bin number.
        bin: usize,
    },

    /// A log reports a bin the persisted partition does not have.
    #[error("result for bin {bin} in {name}, but the partition has {num_bins} bins")]
    UnknownBin {
        /// Combination name.
        name: String,
        /// Reported bin number.
        bin: usize,
        /// Bin count of the partition.
        num_bins: usize,
    },

    /// An item index lies outside the population.
    #[error("index {index} out of range for population of {len}")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Population size.
        len: usize,
    },

    /// Underlying file system failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Builds a [`Error::Configuration`] from any message.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }
}
