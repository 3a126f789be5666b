//! Step 3: job specification inputs for every (selection, feature) combination.
//!
//! Each job file carries the bin indices the job must process and the
//! substitution values the external templating stage fills into its
//! scheduler script and job configuration.
//!
//! `<combination>/jobs.json` lists the job files of the latest run. An
//! overwriting rerun that creates fewer jobs removes the higher-numbered job
//! files left by the previous run.

use std::collections::BTreeSet;

use log::info;
use serde::{Deserialize, Serialize};

use super::{load_bins, outcome_for_error, selection_label, selection_partition, Stores};
use crate::chunk::{self, Job, JobPlan};
use crate::config::{FeatureGap, PipelineConfig};
use crate::error::Result;
use crate::names::{self, ShortNames};
use crate::report::{RunReport, UnitResult};
use crate::results;
use crate::store::WriteMode;

/// Named values substituted into one job's templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitutions {
    /// Partition name (selection attribute short names).
    pub selection: String,
    /// Feature short name.
    pub feature: String,
    /// Feature-gap category.
    pub feature_gap: FeatureGap,
    /// 1-based job number.
    pub job: usize,
}

/// Everything an external job needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Bin indices in processing order.
    pub units: Vec<usize>,
    /// Template values.
    pub substitutions: Substitutions,
}

/// Index of the job files written for one combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobManifest {
    /// Combination name.
    pub combination: String,
    /// Bin count of the partition.
    pub num_bins: usize,
    /// Bins distributed in this run.
    pub pending: usize,
    /// Artifact names of the job files, in job order.
    pub jobs: Vec<String>,
}

/// Name of the job file of one job.
pub fn job_artifact(combination: &str, job: usize) -> String {
    format!("{combination}/job_{job}")
}

/// Name of the manifest of one combination.
pub fn manifest_artifact(combination: &str) -> String {
    format!("{combination}/jobs")
}

/// Writes job specifications for every combination.
///
/// # Errors
///
/// Returns an error if no feature is configured or the short-name
/// dictionary cannot be loaded.
pub fn run(config: &PipelineConfig) -> anyhow::Result<RunReport> {
    let features = config.require_features()?;
    let names = super::load_short_names(&config.paths.short_names)?;
    let stores = Stores::new(config);

    let mut report = RunReport::new();
    for selection in &config.selections {
        let label = selection_label(selection);
        let prepared = selection_partition(&names, selection)
            .and_then(|partition| Ok((load_bins(&stores.bins, &partition)?.len(), partition)));
        let (num_bins, partition) = match prepared {
            Ok(found) => found,
            Err(e) => {
                report.push(outcome_for_error(&label, e));
                continue;
            }
        };

        for feature in features {
            let unit = format!("{label} x {feature}");
            let result = plan_combination(config, &stores, &names, &partition, feature, num_bins);
            report.push(result.unwrap_or_else(|e| outcome_for_error(&unit, e)));
        }
    }
    Ok(report)
}

fn plan_combination(
    config: &PipelineConfig,
    stores: &Stores,
    names: &ShortNames,
    partition: &str,
    feature: &str,
    num_bins: usize,
) -> Result<UnitResult> {
    let feature_short = names.get(feature)?;
    let combination = names::combination_name(partition, feature_short);
    let mut rng = super::unit_rng(config.jobs.seed, &combination);

    let completed = if config.jobs.check_existing {
        results::completed_bins(&config.paths.results.join(&combination))?
    } else {
        BTreeSet::new()
    };
    let pending = chunk::pending(num_bins, &completed);
    let shuffle = if config.jobs.randomize {
        Some(&mut rng)
    } else {
        None
    };

    let assignment = match chunk::assign(pending, config.jobs.num_jobs, shuffle) {
        JobPlan::NothingToDo => {
            return Ok(UnitResult::skip(
                combination,
                format!("nothing to do: all {num_bins} bins already have results"),
            ))
        }
        JobPlan::Jobs(assignment) => assignment,
    };
    info!(
        "{combination}: {} pending bins over {} jobs",
        assignment.units().count(),
        assignment.len()
    );

    let mode = WriteMode::from_overwrite(config.overwrite);
    let mut written = Vec::new();
    let mut job_names = Vec::new();
    for Job { number, units } in &assignment.jobs {
        let spec = JobSpec {
            units: units.clone(),
            substitutions: Substitutions {
                selection: partition.to_string(),
                feature: feature_short.to_string(),
                feature_gap: config.jobs.feature_gap,
                job: *number,
            },
        };
        let name = job_artifact(&combination, *number);
        written.push(stores.runfiles.write(&name, &spec, mode)?);
        job_names.push(name);
    }

    if mode == WriteMode::Overwrite {
        for stale in (assignment.len() + 1..).map(|n| job_artifact(&combination, n)) {
            if !stores.runfiles.remove(&stale)? {
                break;
            }
            info!("{combination}: removed stale {stale}");
        }
    }

    let manifest = JobManifest {
        combination: combination.clone(),
        num_bins,
        pending: assignment.units().count(),
        jobs: job_names,
    };
    written.push(
        stores
            .runfiles
            .write(&manifest_artifact(&combination), &manifest, mode)?,
    );

    let sizes = assignment.sizes();
    let message = format!(
        "{} bins over {} jobs (sizes {}..={}), {} already done",
        manifest.pending,
        assignment.len(),
        sizes.iter().min().copied().unwrap_or(0),
        sizes.iter().max().copied().unwrap_or(0),
        completed.len()
    );
    Ok(UnitResult::done(combination, message).with_details(
        written
            .iter()
            .map(|p| format!("Written: {}", p.display()))
            .collect(),
    ))
}

/// Reads back the job specification of one job.
///
/// # Errors
///
/// Returns [`crate::Error::MissingPrerequisite`] if the job file does not exist.
pub fn read_job(stores: &Stores, combination: &str, job: usize) -> Result<JobSpec> {
    stores.runfiles.read(&job_artifact(combination, job))
}
