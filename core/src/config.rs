//! Validated pipeline configuration.
//!
//! One file configures all four steps. Unknown keys are rejected at load
//! time, every optional key has a documented default, and [`PipelineConfig::validate`]
//! checks value ranges before any step runs.
//!
//! ```toml
//! overwrite = false
//!
//! [paths]
//! attributes = "attributes.json"
//! short_names = "short_names.toml"
//!
//! [[selections]]
//! attributes = [{ name = "degree", noise = true }, { name = "rich club" }]
//!
//! [partition]
//! leaf_size = 100
//!
//! [jobs]
//! num_jobs = 8
//! features = ["transitive clustering"]
//! feature_gap = "high"
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Input and output locations.
    pub paths: Paths,
    /// Attribute lists to partition by; each is one unit of work.
    pub selections: Vec<Selection>,
    /// Partitioning options.
    #[serde(default)]
    pub partition: PartitionOptions,
    /// Job distribution options.
    #[serde(default)]
    pub jobs: JobOptions,
    /// Result collection options.
    #[serde(default)]
    pub collect: CollectOptions,
    /// Replace existing artifacts instead of failing (default `false`).
    #[serde(default)]
    pub overwrite: bool,
}

/// File system locations. Relative paths are resolved against the
/// directory of the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Paths {
    /// Attribute table (JSON).
    pub attributes: PathBuf,
    /// Short-name dictionary (JSON or TOML).
    pub short_names: PathBuf,
    /// Bins, split paths and centroids (default `bins`).
    #[serde(default = "default_bins_dir")]
    pub bins: PathBuf,
    /// Noise vectors (default `noise`).
    #[serde(default = "default_noise_dir")]
    pub noise: PathBuf,
    /// Per-bin binary masks (default `parameters`).
    #[serde(default = "default_parameters_dir")]
    pub parameters: PathBuf,
    /// Job specification files (default `runfiles`).
    #[serde(default = "default_runfiles_dir")]
    pub runfiles: PathBuf,
    /// Logs written by external jobs, one directory per combination (default `results`).
    #[serde(default = "default_results_dir")]
    pub results: PathBuf,
    /// Result tables (default `tables`).
    #[serde(default = "default_tables_dir")]
    pub tables: PathBuf,
}

fn default_bins_dir() -> PathBuf {
    PathBuf::from("bins")
}
fn default_noise_dir() -> PathBuf {
    PathBuf::from("noise")
}
fn default_parameters_dir() -> PathBuf {
    PathBuf::from("parameters")
}
fn default_runfiles_dir() -> PathBuf {
    PathBuf::from("runfiles")
}
fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}
fn default_tables_dir() -> PathBuf {
    PathBuf::from("tables")
}

/// One ordered list of selection attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Selection {
    /// Attributes in splitting order; the order is part of the partition identity.
    pub attributes: Vec<SelectionAttribute>,
    /// Overrides [`PartitionOptions::leaf_size`] for this selection.
    #[serde(default)]
    pub leaf_size: Option<usize>,
}

impl Selection {
    /// Attribute names in order.
    pub fn names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }
}

/// A selection attribute and its noise flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionAttribute {
    /// Column name in the attribute table.
    pub name: String,
    /// Add tie-breaking noise before partitioning (default `false`).
    #[serde(default)]
    pub noise: bool,
}

/// Options of the partitioning step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartitionOptions {
    /// Target leaf size of the kd-tree (default 100).
    #[serde(default = "default_leaf_size")]
    pub leaf_size: usize,
    /// Seed for noise generation; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Load existing noise artifacts instead of generating new ones (default `false`).
    #[serde(default)]
    pub reuse_noise: bool,
}

fn default_leaf_size() -> usize {
    100
}

impl Default for PartitionOptions {
    fn default() -> Self {
        Self {
            leaf_size: default_leaf_size(),
            seed: None,
            reuse_noise: false,
        }
    }
}

/// Feature-gap category passed to every job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureGap {
    /// Lowest-valued neighbourhoods.
    Low,
    /// Highest-valued neighbourhoods.
    #[default]
    High,
    /// No gap selection.
    All,
}

/// Options of the job distribution step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobOptions {
    /// Requested number of jobs per combination (default 1).
    #[serde(default = "default_num_jobs")]
    pub num_jobs: usize,
    /// Skip bins whose results already exist (default `false`).
    #[serde(default)]
    pub check_existing: bool,
    /// Shuffle work units before chunking (default `false`).
    #[serde(default)]
    pub randomize: bool,
    /// Shuffle seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Feature parameter names (full names, looked up in the short-name dictionary).
    #[serde(default)]
    pub features: Vec<String>,
    /// Feature-gap category (default `high`).
    #[serde(default)]
    pub feature_gap: FeatureGap,
}

fn default_num_jobs() -> usize {
    1
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            num_jobs: default_num_jobs(),
            check_existing: false,
            randomize: false,
            seed: None,
            features: Vec::new(),
            feature_gap: FeatureGap::default(),
        }
    }
}

/// Options of the result collection step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectOptions {
    /// Persist tables even when bins are missing (default `false`).
    #[serde(default)]
    pub collect_incomplete: bool,
}

impl PipelineConfig {
    /// Loads a `.json` or `.toml` configuration, resolves relative paths
    /// against the file's directory and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Configuration`] if it cannot be parsed or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&text, path)?;
        if let Some(base) = path.parent() {
            config.paths.resolve(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration text; the format follows the extension of `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] on unknown keys, missing keys or bad values.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let parsed = match origin.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(text).map_err(|e| e.to_string()),
            _ => serde_json::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|e| Error::config(format!("{}: {e}", origin.display())))
    }

    /// Checks value ranges and uniqueness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.selections.is_empty() {
            return Err(Error::config("at least one selection is required"));
        }
        if self.partition.leaf_size == 0 {
            return Err(Error::config("partition.leaf_size must be at least 1"));
        }
        if self.jobs.num_jobs == 0 {
            return Err(Error::config("jobs.num_jobs must be at least 1"));
        }

        let mut seen = BTreeSet::new();
        for (i, selection) in self.selections.iter().enumerate() {
            let names = selection.names();
            if names.is_empty() {
                return Err(Error::config(format!(
                    "selections[{i}] must name at least one attribute"
                )));
            }
            if selection.leaf_size == Some(0) {
                return Err(Error::config(format!(
                    "selections[{i}].leaf_size must be at least 1"
                )));
            }
            let distinct: BTreeSet<&str> = names.iter().copied().collect();
            if distinct.len() != names.len() {
                return Err(Error::config(format!(
                    "selections[{i}] repeats an attribute: {names:?}"
                )));
            }
            if !seen.insert(names) {
                return Err(Error::config(format!(
                    "selections[{i}] duplicates an earlier selection"
                )));
            }
        }

        let features: BTreeSet<&str> = self.jobs.features.iter().map(String::as_str).collect();
        if features.len() != self.jobs.features.len() {
            return Err(Error::config("jobs.features contains duplicates"));
        }
        Ok(())
    }

    /// Feature names, failing when none are configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `jobs.features` is empty.
    pub fn require_features(&self) -> Result<&[String]> {
        if self.jobs.features.is_empty() {
            return Err(Error::config(
                "jobs.features must list at least one feature for this step",
            ));
        }
        Ok(&self.jobs.features)
    }

    /// Leaf size of a selection, falling back to the global option.
    pub fn leaf_size(&self, selection: &Selection) -> usize {
        selection.leaf_size.unwrap_or(self.partition.leaf_size)
    }
}

impl Paths {
    /// Joins every relative path onto `base`.
    pub fn resolve(&mut self, base: &Path) {
        for path in [
            &mut self.attributes,
            &mut self.short_names,
            &mut self.bins,
            &mut self.noise,
            &mut self.parameters,
            &mut self.runfiles,
            &mut self.results,
            &mut self.tables,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
