//! `binsplit-collect`: Aggregates per-bin result logs into result tables.
//!
//! Incomplete combinations are reported as skipped and not persisted unless
//! `--collect-incomplete` (or `collect.collect_incomplete`) is set.
//!
//! **Usage:**
//! ```
//! binsplit-collect <config> [--overwrite] [--collect-incomplete]
//! ```
//!
//! Exits non-zero if any combination failed.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use binsplit_core::{pipeline, PipelineConfig};
use clap::Parser;
use env_logger::Env;
use log::warn;

/// Collect result tables.
#[derive(Parser)]
#[command(
    name = "binsplit-collect",
    about = "Aggregate result logs into one table per combination"
)]
struct Args {
    /// Pipeline configuration (.toml or .json).
    config: PathBuf,

    /// Replace existing tables.
    #[arg(long)]
    overwrite: bool,

    /// Persist tables even when some bins have no result.
    #[arg(long)]
    collect_incomplete: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = PipelineConfig::load(&args.config)
        .with_context(|| format!("Failed to load config: {}", args.config.display()))?;
    config.overwrite |= args.overwrite;
    config.collect.collect_incomplete |= args.collect_incomplete;

    let report = pipeline::collect::run(&config)?;
    println!("{}", report.render("binsplit collect"));

    if report.skipped_count() > 0 {
        warn!(
            "{} combination(s) skipped; rerun once their jobs have finished",
            report.skipped_count()
        );
    }
    if !report.all_passed() {
        eprintln!(
            "Collection FAILED: {} combination(s) did not complete.",
            report.failure_count()
        );
        process::exit(1);
    }
    Ok(())
}
