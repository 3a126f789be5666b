//! Step 4: result tables assembled from the per-bin result logs.

use log::info;

use super::{load_bins, outcome_for_error, selection_label, selection_partition, Stores};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::names::{self, ShortNames};
use crate::report::{RunReport, UnitResult};
use crate::results::{self, CompletenessPolicy, ResultTable};
use crate::store::WriteMode;

/// Collects one result table per combination.
///
/// # Errors
///
/// Returns an error if no feature is configured or the short-name
/// dictionary cannot be loaded.
pub fn run(config: &PipelineConfig) -> anyhow::Result<RunReport> {
    let features = config.require_features()?;
    let names = super::load_short_names(&config.paths.short_names)?;
    let stores = Stores::new(config);
    let policy = if config.collect.collect_incomplete {
        CompletenessPolicy::CollectIncomplete
    } else {
        CompletenessPolicy::RequireComplete
    };

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
            let result =
                collect_combination(config, &stores, &names, &partition, feature, num_bins, policy);
            report.push(result.unwrap_or_else(|e| outcome_for_error(&unit, e)));
        }
    }
    Ok(report)
}

fn collect_combination(
    config: &PipelineConfig,
    stores: &Stores,
    names: &ShortNames,
    partition: &str,
    feature: &str,
    num_bins: usize,
    policy: CompletenessPolicy,
) -> Result<UnitResult> {
    let combination = names::combination_name(partition, names.get(feature)?);
    let log_dir = config.paths.results.join(&combination);
    if !log_dir.is_dir() {
        return Ok(UnitResult::skip(
            combination,
            format!("no result logs at {}", log_dir.display()),
        ));
    }

    let records = results::parse_log_dir(&log_dir)?;
    let table = policy.check(ResultTable::assemble(&combination, records, num_bins)?)?;
    info!(
        "{combination}: {} of {num_bins} bins reported",
        table.records.len()
    );

    let path = stores.tables.write(
        &names::table_artifact(&combination),
        &table,
        WriteMode::from_overwrite(config.overwrite),
    )?;

    let mut details = vec![format!("Written: {}", path.display())];
    let message = if table.is_complete() {
        format!("{num_bins} bins collected")
    } else {
        details.push(format!("Missing bins: {:?}", table.missing));
        format!(
            "{} of {num_bins} bins collected (incomplete)",
            table.records.len()
        )
    };
    Ok(UnitResult::done(combination, message).with_details(details))
}

/// Reads back a persisted result table.
///
/// # Errors
///
/// Returns [`crate::Error::MissingPrerequisite`] if the table was never written.
pub fn read_table(stores: &Stores, combination: &str) -> Result<ResultTable> {
    stores.tables.read(&names::table_artifact(combination))
}
