//! Short-name dictionary and deterministic artifact names.
//!
//! Artifact identity is derived from the ordered list of selection attribute
//! short names, so rerunning with the same attributes in the same order maps
//! to the same files.
//!
//! | Artifact | Name |
//! |----------|------|
//! | bins | `bins_<partition>` |
//! | split paths | `paths_<partition>` |
//! | centroids | `centroids_<partition>` |
//! | noise | `noise_<attribute>_<partition>` |
//! | mask | `<partition>/mask_<partition>_<bin>` |
//! | result table | `table_<combination>` |

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Separator between attribute short names inside a partition name.
pub const ATTRIBUTE_SEPARATOR: &str = "-";
/// Separator between name components.
pub const COMPONENT_SEPARATOR: &str = "_";

/// Mapping from full attribute/feature names to short identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortNames {
    entries: BTreeMap<String, String>,
}

impl ShortNames {
    /// Builds a dictionary from `(full, short)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Loads a dictionary from a `.json` or `.toml` file holding a flat table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, and
    /// [`Error::Configuration`] if it is not a flat string table.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, String> = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&text).map_err(|e| {
                Error::config(format!("{}: invalid short-name table: {e}", path.display()))
            })?,
            _ => serde_json::from_str(&text).map_err(|e| {
                Error::config(format!("{}: invalid short-name table: {e}", path.display()))
            })?,
        };
        Ok(Self { entries })
    }

    /// Short name of `full`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `full` has no entry.
    pub fn get(&self, full: &str) -> Result<&str> {
        self.entries
            .get(full)
            .map(String::as_str)
            .ok_or_else(|| Error::config(format!("no short name defined for {full:?}")))
    }

    /// Short names of `fulls`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for the first name without an entry.
    pub fn get_all<S: AsRef<str>>(&self, fulls: &[S]) -> Result<Vec<&str>> {
        fulls.iter().map(|f| self.get(f.as_ref())).collect()
    }
}

/// Partition identity: attribute short names joined in order.
pub fn partition_name<S: AsRef<str>>(shorts: &[S]) -> String {
    shorts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(ATTRIBUTE_SEPARATOR)
}

/// Identity of one (selection, feature) combination.
pub fn combination_name(partition: &str, feature: &str) -> String {
    format!("{partition}{COMPONENT_SEPARATOR}{feature}")
}

/// Name of the bins artifact of a partition.
pub fn bins_artifact(partition: &str) -> String {
    format!("bins{COMPONENT_SEPARATOR}{partition}")
}

/// Name of the split-path artifact of a partition.
pub fn paths_artifact(partition: &str) -> String {
    format!("paths{COMPONENT_SEPARATOR}{partition}")
}

/// Name of the centroid artifact of a partition.
pub fn centroids_artifact(partition: &str) -> String {
    format!("centroids{COMPONENT_SEPARATOR}{partition}")
}

/// Name of the noise artifact of one attribute within a partition.
pub fn noise_artifact(attribute: &str, partition: &str) -> String {
    format!("noise{COMPONENT_SEPARATOR}{attribute}{COMPONENT_SEPARATOR}{partition}")
}

/// Name of the mask artifact of one bin, grouped in a per-partition directory.
pub fn mask_artifact(partition: &str, bin: usize) -> String {
    format!("{partition}/mask{COMPONENT_SEPARATOR}{partition}{COMPONENT_SEPARATOR}{bin}")
}

/// Name of the result table artifact of a combination.
pub fn table_artifact(combination: &str) -> String {
    format!("table{COMPONENT_SEPARATOR}{combination}")
}
