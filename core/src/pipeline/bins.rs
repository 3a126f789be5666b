//! Step 1: noise injection and kd-tree partitioning of every selection.

use anyhow::Context;
use log::info;

use super::{outcome_for_error, selection_label, selection_partition, Stores};
use crate::attributes::AttributeTable;
use crate::config::{PipelineConfig, Selection};
use crate::error::{Error, Result};
use crate::names::{self, ShortNames};
use crate::noise::{self, NoiseVector};
use crate::partition::partition;
use crate::report::{RunReport, UnitResult};
use crate::store::{ArrayArtifact, ArrayData, WriteMode};

/// Partitions every configured selection.
///
/// # Errors
///
/// Returns an error only if the attribute table or the short-name
/// dictionary cannot be loaded; per-selection problems are reported.
pub fn run(config: &PipelineConfig) -> anyhow::Result<RunReport> {
    let names = super::load_short_names(&config.paths.short_names)?;
    let table = AttributeTable::load(&config.paths.attributes).with_context(|| {
        format!(
            "Failed to load attribute table: {}",
            config.paths.attributes.display()
        )
    })?;
    let stores = Stores::new(config);

    let mut report = RunReport::new();
    for selection in &config.selections {
        let label = selection_label(selection);
        info!("partitioning by [{label}]");
        let result = partition_selection(config, &stores, &names, &table, selection);
        report.push(result.unwrap_or_else(|e| outcome_for_error(&label, e)));
    }
    Ok(report)
}

fn partition_selection(
    config: &PipelineConfig,
    stores: &Stores,
    names: &ShortNames,
    table: &AttributeTable,
    selection: &Selection,
) -> Result<UnitResult> {
    let partition_name = selection_partition(names, selection)?;
    let mut rng = super::unit_rng(config.partition.seed, &partition_name);
    let mode = WriteMode::from_overwrite(config.overwrite);

    let outputs = [
        names::bins_artifact(&partition_name),
        names::paths_artifact(&partition_name),
        names::centroids_artifact(&partition_name),
    ];
    if mode == WriteMode::CreateNew {
        if let Some(existing) = outputs.iter().find(|n| stores.bins.exists(n)) {
            return Err(Error::ArtifactConflict {
                path: stores.bins.path_of(existing),
            });
        }
    }

    let mut written = Vec::new();
    let mut columns = Vec::with_capacity(selection.attributes.len());
    for attribute in &selection.attributes {
        let raw = table.column(&attribute.name)?;
        let noised = if attribute.noise {
            let short = names.get(&attribute.name)?;
            let artifact = names::noise_artifact(short, &partition_name);
            let noise = if config.partition.reuse_noise && stores.noise.exists(&artifact) {
                info!("reusing noise {artifact}");
                load_noise(stores, &artifact, raw.len())?
            } else {
                let noise = noise::generate(raw, &mut rng);
                let stored = ArrayArtifact::vector(&artifact, ArrayData::F64(noise.values.clone()));
                written.push(stores.noise.write_array(&stored, mode)?);
                noise
            };
            noise::apply(raw, &noise)
        } else {
            noise::inject(raw, false, &mut rng)
        };
        info!(
            "{}: uniqueness {:.6} over {} items",
            attribute.name,
            noised.uniqueness,
            raw.len()
        );
        columns.push(noised.values);
    }

    let leaf_size = config.leaf_size(selection);
    let result = partition(table.len(), &columns, leaf_size)?;
    debug_assert!(result.verify(table.len()), "partition invariant violated");

    let [bins_name, paths_name, centroids_name] = outputs;
    let centroids = result.centroids(&columns);
    written.push(stores.bins.write_array(
        &ArrayArtifact::vector(bins_name, ArrayData::IndexLists(result.bins.clone())),
        mode,
    )?);
    written.push(stores.bins.write_array(
        &ArrayArtifact::vector(paths_name, ArrayData::Str(result.paths.clone())),
        mode,
    )?);
    written.push(
        stores
            .bins
            .write_array(&ArrayArtifact::matrix(centroids_name, centroids), mode)?,
    );

    let oversized = result.oversized();
    let mut message = format!(
        "{} bins over {} items (leaf size {leaf_size})",
        result.len(),
        table.len()
    );
    if !oversized.is_empty() {
        message.push_str(&format!(
            "; {} bin(s) exceed the leaf size because of duplicated points",
            oversized.len()
        ));
    }
    Ok(UnitResult::done(partition_name, message).with_details(
        written
            .iter()
            .map(|p| format!("Written: {}", p.display()))
            .collect(),
    ))
}

fn load_noise(stores: &Stores, artifact: &str, len: usize) -> Result<NoiseVector> {
    let stored = stores.noise.read_array(artifact)?;
    let values = stored.as_f64().filter(|v| v.len() == len).ok_or_else(|| {
        Error::config(format!(
            "{} does not hold {len} noise values",
            stores.noise.path_of(artifact).display()
        ))
    })?;
    let magnitude = values.iter().fold(0.0_f64, |m, u| m.max(u.abs()));
    Ok(NoiseVector {
        values: values.to_vec(),
        magnitude,
    })
}
