//! Batch drivers for the four pipeline steps.
//!
//! Each driver walks its units of work (a selection for steps 1 and 2, a
//! selection x feature combination for steps 3 and 4) and records one
//! [`UnitResult`] per unit. A failing unit never stops the batch; only
//! failures outside any unit (unreadable inputs shared by every unit) abort
//! the run with an [`anyhow::Error`].
//!
//! | Step | Driver | Reads | Writes |
//! |------|--------|-------|--------|
//! | 1 | [`bins::run`] | attribute table | noise, bins, paths, centroids |
//! | 2 | [`parameters::run`] | bins | masks |
//! | 3 | [`runfiles::run`] | bins, result logs | job specs |
//! | 4 | [`collect::run`] | bins, result logs | result tables |

pub mod bins;
pub mod collect;
pub mod parameters;
pub mod runfiles;

use std::path::Path;

use anyhow::Context;
use log::{error, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{PipelineConfig, Selection};
use crate::error::{Error, Result};
use crate::names::{self, ShortNames};
use crate::report::UnitResult;
use crate::store::ArtifactStore;

/// Turns a unit error into its report entry.
///
/// Incomplete results are skipped rather than failed.
pub fn outcome_for_error(unit: &str, err: Error) -> UnitResult {
    match err {
        Error::IncompleteResult { .. } => {
            warn!("{unit}: {err}");
            UnitResult::skip(unit, err.to_string())
        }
        _ => {
            error!("{unit}: {err}");
            UnitResult::fail(unit, err.to_string())
        }
    }
}

/// Label of a selection before its short names are known.
pub fn selection_label(selection: &Selection) -> String {
    selection.names().join(", ")
}

/// Partition identity of a selection.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if an attribute has no short name.
pub fn selection_partition(names: &ShortNames, selection: &Selection) -> Result<String> {
    let shorts = names.get_all(&selection.names())?;
    Ok(names::partition_name(&shorts))
}

/// Bins of a persisted partition.
///
/// # Errors
///
/// Returns [`Error::MissingPrerequisite`] if step 1 has not produced the
/// partition, and [`Error::Configuration`] if the artifact holds the wrong dtype.
pub fn load_bins(bins_store: &ArtifactStore, partition: &str) -> Result<Vec<Vec<usize>>> {
    let name = names::bins_artifact(partition);
    let path = bins_store.path_of(&name);
    if !path.exists() {
        return Err(Error::MissingPrerequisite {
            what: format!("partition {partition:?} (run the bins step first)"),
            path,
        });
    }
    let artifact = bins_store.read_array(&name)?;
    artifact
        .as_index_lists()
        .map(<[Vec<usize>]>::to_vec)
        .ok_or_else(|| {
            Error::config(format!(
                "{} does not hold index lists",
                bins_store.path_of(&name).display()
            ))
        })
}

/// Loads the short-name dictionary shared by every unit.
///
/// # Errors
///
/// Fails if the dictionary cannot be read or parsed.
pub fn load_short_names(path: &Path) -> anyhow::Result<ShortNames> {
    ShortNames::load(path)
        .with_context(|| format!("Failed to load short-name dictionary: {}", path.display()))
}

/// Generator of one unit of work.
///
/// With a configured seed the stream depends only on the seed and the unit
/// name, never on the other units of the run. Without one it is seeded from
/// entropy.
pub fn unit_rng(seed: Option<u64>, unit: &str) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ name_hash(unit)),
        None => StdRng::from_entropy(),
    }
}

// 64-bit FNV-1a
fn name_hash(name: &str) -> u64 {
    name.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Stores of every artifact directory named in the configuration.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Bins, split paths, centroids.
    pub bins: ArtifactStore,
    /// Noise vectors.
    pub noise: ArtifactStore,
    /// Binary masks.
    pub parameters: ArtifactStore,
    /// Job specs.
    pub runfiles: ArtifactStore,
    /// Result tables.
    pub tables: ArtifactStore,
}

impl Stores {
    /// Opens the stores configured in `config.paths`.
    pub fn new(config: &PipelineConfig) -> Self {
        let p = &config.paths;
        Self {
            bins: ArtifactStore::new(&p.bins),
            noise: ArtifactStore::new(&p.noise),
            parameters: ArtifactStore::new(&p.parameters),
            runfiles: ArtifactStore::new(&p.runfiles),
            tables: ArtifactStore::new(&p.tables),
        }
    }
}
