//! `binsplit-bins`: Partitions the item population by every configured selection.
//!
//! For each selection: adds tie-breaking noise to the flagged attributes,
//! builds the kd-tree and writes bins, split paths and centroids.
//!
//! **Usage:**
//! ```
//! binsplit-bins <config> [--overwrite]
//! ```
//!
//! Exits non-zero if any selection failed.

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

/// Partition items into bins.
#[derive(Parser)]
#[command(
    name = "binsplit-bins",
    about = "Partition items into bins with a sliding-midpoint kd-tree"
)]
struct Args {
    /// Pipeline configuration (.toml or .json).
    config: PathBuf,

    /// Replace existing noise and bin artifacts.
    #[arg(long)]
    overwrite: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = PipelineConfig::load(&args.config)
        .with_context(|| format!("Failed to load config: {}", args.config.display()))?;
    config.overwrite |= args.overwrite;

    let report = pipeline::bins::run(&config)?;
    println!("{}", report.render("binsplit bins"));

    if !report.all_passed() {
        eprintln!(
            "Partitioning FAILED: {} selection(s) did not complete.",
            report.failure_count()
        );
        process::exit(1);
    }
    Ok(())
}
