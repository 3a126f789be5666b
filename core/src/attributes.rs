//! Read-only tabular source of item attributes.
//!
//! The table is a JSON object mapping attribute names to columns of equal
//! length; row `i` of every column describes item `i`.
//!
//! ```json
//! { "degree": [3, 8, 1], "rich club": [0.2, 0.9, 0.1] }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Named attribute columns over a fixed population.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeTable {
    source: PathBuf,
    len: usize,
    columns: BTreeMap<String, Vec<f64>>,
}

impl AttributeTable {
    /// Builds a table from in-memory columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the columns differ in length.
    pub fn from_columns(
        source: impl Into<PathBuf>,
        columns: BTreeMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let source = source.into();
        let mut lengths = columns.iter().map(|(name, col)| (name, col.len()));
        let len = match lengths.next() {
            Some((_, len)) => len,
            None => 0,
        };
        if let Some((name, other)) = lengths.find(|(_, l)| *l != len) {
            return Err(Error::config(format!(
                "{}: attribute {name:?} has {other} values, expected {len}",
                source.display()
            )));
        }
        Ok(Self {
            source,
            len,
            columns,
        })
    }

    /// Loads a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Configuration`] if it is not a table of equal-length numeric columns.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let columns: BTreeMap<String, Vec<f64>> = serde_json::from_str(&text).map_err(|e| {
            Error::config(format!("{}: invalid attribute table: {e}", path.display()))
        })?;
        Self::from_columns(path, columns)
    }

    /// Population size N.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the population is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Column of the attribute `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the attribute and the source
    /// file if the column does not exist.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns.get(name).map(Vec::as_slice).ok_or_else(|| {
            Error::config(format!(
                "attribute {name:?} not found in {}",
                self.source.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Result<AttributeTable> {
        AttributeTable::from_columns(
            "attrs.json",
            BTreeMap::from([
                ("degree".to_string(), vec![3.0, 8.0, 1.0]),
                ("rich club".to_string(), vec![0.2, 0.9, 0.1]),
            ]),
        )
    }

    #[test]
    fn lookup_by_name() -> Result<()> {
        let t = table()?;
        assert_eq!(t.len(), 3);
        assert_eq!(t.column("degree")?, &[3.0, 8.0, 1.0]);
        Ok(())
    }

    #[test]
    fn absent_attribute_names_the_source() -> Result<()> {
        let err = table()?.column("size").map(|_| ());
        assert!(
            matches!(&err, Err(Error::Configuration(m)) if m.contains("\"size\"") && m.contains("attrs.json"))
        );
        Ok(())
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let t = AttributeTable::from_columns(
            "attrs.json",
            BTreeMap::from([("a".to_string(), vec![1.0]), ("b".to_string(), vec![])]),
        );
        assert!(matches!(t, Err(Error::Configuration(_))));
    }
}
