//! `binsplit-runfiles`: Chunks bins into job specifications.
//!
//! For every (selection, feature) combination, distributes the pending bins
//! over the configured number of jobs and writes one specification per job
//! plus a manifest. With `jobs.check_existing`, bins that already have
//! results are left out.
//!
//! **Usage:**
//! ```
//! binsplit-runfiles <config> [--overwrite] [--num-jobs <n>]
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

/// Write job specifications.
#[derive(Parser)]
#[command(
    name = "binsplit-runfiles",
    about = "Distribute bins over jobs and write job specifications"
)]
struct Args {
    /// Pipeline configuration (.toml or .json).
    config: PathBuf,

    /// Replace existing job files.
    #[arg(long)]
    overwrite: bool,

    /// Overrides `jobs.num_jobs`.
    #[arg(long)]
    num_jobs: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = PipelineConfig::load(&args.config)
        .with_context(|| format!("Failed to load config: {}", args.config.display()))?;
    config.overwrite |= args.overwrite;
    if let Some(num_jobs) = args.num_jobs {
        config.jobs.num_jobs = num_jobs;
        config.validate()?;
    }

    let report = pipeline::runfiles::run(&config)?;
    println!("{}", report.render("binsplit runfiles"));

    if !report.all_passed() {
        eprintln!(
            "Job planning FAILED: {} combination(s) did not complete.",
            report.failure_count()
        );
        process::exit(1);
    }
    Ok(())
}
