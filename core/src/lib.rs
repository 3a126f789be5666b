//! Spatial binning of a large item population for distributed featurization.
//!
//! The crate partitions items by a selection of numeric attributes with a
//! sliding-midpoint kd-tree, encodes every bin as a binary mask, chunks the
//! bins into job specifications for an external batch system and finally
//! aggregates the per-bin result logs into one table per combination.
//!
//! # Pipeline
//!
//! | Step | Module | Output |
//! |------|--------|--------|
//! | 1 | [`pipeline::bins`] | noise vectors, bins, split paths, centroids |
//! | 2 | [`pipeline::parameters`] | one binary mask per bin |
//! | 3 | [`pipeline::runfiles`] | job specifications and manifests |
//! | 4 | [`pipeline::collect`] | result tables |
//!
//! The algorithmic cores ([`partition`], [`noise`], [`mask`], [`chunk`],
//! [`results`]) have no filesystem dependencies and can be used on their own.
//!
//! # Entry Point
//!
//! ```no_run
//! use binsplit_core::{pipeline, PipelineConfig};
//! use std::path::Path;
//!
//! let config = PipelineConfig::load(Path::new("binsplit.toml")).expect("Failed to load config");
//! let report = pipeline::bins::run(&config).expect("Failed to partition");
//! assert!(report.all_passed());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod attributes;
pub mod chunk;
pub mod config;
pub mod error;
pub mod mask;
pub mod names;
pub mod noise;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod results;
pub mod store;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use report::{RunReport, Status, UnitResult};
