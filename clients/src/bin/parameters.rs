//! `binsplit-parameters`: Writes one binary mask per bin.
//!
//! Reads the bins written by `binsplit-bins` and encodes each bin as a mask
//! over the whole population for the featurization stage.
//!
//! **Usage:**
//! ```
//! binsplit-parameters <config> [--overwrite]
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

/// Encode bins as binary masks.
#[derive(Parser)]
#[command(
    name = "binsplit-parameters",
    about = "Write one binary mask per bin"
)]
struct Args {
    /// Pipeline configuration (.toml or .json).
    config: PathBuf,

    /// Replace existing masks.
    #[arg(long)]
    overwrite: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = PipelineConfig::load(&args.config)
        .with_context(|| format!("Failed to load config: {}", args.config.display()))?;
    config.overwrite |= args.overwrite;

    let report = pipeline::parameters::run(&config)?;
    println!("{}", report.render("binsplit parameters"));

    if !report.all_passed() {
        eprintln!(
            "Mask generation FAILED: {} selection(s) did not complete.",
            report.failure_count()
        );
        process::exit(1);
    }
    Ok(())
}
