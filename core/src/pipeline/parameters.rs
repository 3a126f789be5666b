//! Step 2: one binary mask ("parameter") per bin for the featurization stage.

use log::info;

use super::{load_bins, outcome_for_error, selection_label, selection_partition, Stores};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::mask;
use crate::names;
use crate::report::{RunReport, UnitResult};
use crate::store::{ArrayArtifact, ArrayData, WriteMode};

/// Writes the masks of every configured selection's partition.
///
/// # Errors
///
/// Returns an error only if the short-name dictionary cannot be loaded.
pub fn run(config: &PipelineConfig) -> anyhow::Result<RunReport> {
    let names = super::load_short_names(&config.paths.short_names)?;
    let stores = Stores::new(config);
    let mode = WriteMode::from_overwrite(config.overwrite);

    let mut report = RunReport::new();
    for selection in &config.selections {
        let label = selection_label(selection);
        let result = selection_partition(&names, selection)
            .and_then(|partition| write_masks(&stores, &partition, mode));
        report.push(result.unwrap_or_else(|e| outcome_for_error(&label, e)));
    }
    Ok(report)
}

fn write_masks(stores: &Stores, partition: &str, mode: WriteMode) -> Result<UnitResult> {
    let bins = load_bins(&stores.bins, partition)?;
    let population: usize = bins.iter().map(Vec::len).sum();
    info!(
        "writing {} masks of length {population} for {partition}",
        bins.len()
    );

    let mut conflicts = Vec::new();
    let mut written = 0usize;
    for (index, bin) in bins.iter().enumerate() {
        let artifact = ArrayArtifact::vector(
            names::mask_artifact(partition, index),
            ArrayData::U8(mask::encode(bin, population)?),
        );
        match stores.parameters.write_array(&artifact, mode) {
            Ok(_) => written += 1,
            Err(Error::ArtifactConflict { path }) => {
                conflicts.push(format!("Exists: {}", path.display()))
            }
            Err(e) => return Err(e),
        }
    }

    if conflicts.is_empty() {
        Ok(UnitResult::done(
            partition,
            format!("{written} masks of length {population}"),
        ))
    } else {
        Ok(UnitResult::fail(
            partition,
            format!(
                "{} of {} masks already exist (rerun with overwrite to replace them); {written} written",
                conflicts.len(),
                bins.len()
            ),
        )
        .with_details(conflicts))
    }
}
