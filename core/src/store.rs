//! Persisted artifacts and the guarded-overwrite policy.
//!
//! Every artifact is a JSON document under one root directory. Writes use an
//! atomic create-if-absent open, so an existing artifact is never touched
//! unless [`WriteMode::Overwrite`] is requested.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File extension of every artifact.
pub const ARTIFACT_EXTENSION: &str = "json";

/// How to treat an artifact that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Fail with [`Error::ArtifactConflict`].
    #[default]
    CreateNew,
    /// Replace the existing artifact.
    Overwrite,
}

impl WriteMode {
    /// Maps an `overwrite` flag to a mode.
    #[must_use]
    pub fn from_overwrite(overwrite: bool) -> Self {
        if overwrite {
            WriteMode::Overwrite
        } else {
            WriteMode::CreateNew
        }
    }
}

/// Element storage of an [`ArrayArtifact`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "data", rename_all = "snake_case")]
pub enum ArrayData {
    /// Real values.
    F64(Vec<f64>),
    /// Bytes (binary masks).
    U8(Vec<u8>),
    /// Ragged index lists (bins).
    IndexLists(Vec<Vec<usize>>),
    /// Strings (split paths).
    Str(Vec<String>),
}

impl ArrayData {
    /// Number of stored elements at the top level.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::F64(v) => v.len(),
            ArrayData::U8(v) => v.len(),
            ArrayData::IndexLists(v) => v.len(),
            ArrayData::Str(v) => v.len(),
        }
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Self-describing array blob: name, shape, dtype and data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayArtifact {
    /// Artifact name (also its file stem).
    pub name: String,
    /// Logical shape; row-major for multi-dimensional data.
    pub shape: Vec<usize>,
    /// Elements.
    #[serde(flatten)]
    pub data: ArrayData,
}

impl ArrayArtifact {
    /// One-dimensional artifact whose shape is the data length.
    pub fn vector(name: impl Into<String>, data: ArrayData) -> Self {
        Self {
            name: name.into(),
            shape: vec![data.len()],
            data,
        }
    }

    /// Row-major matrix of `rows` rows; the column count is derived.
    pub fn matrix(name: impl Into<String>, rows: Vec<Vec<f64>>) -> Self {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        Self {
            name: name.into(),
            shape: vec![rows.len(), cols],
            data: ArrayData::F64(rows.into_iter().flatten().collect()),
        }
    }

    /// Real values, if this is an `f64` artifact.
    pub fn as_f64(&self) -> Option<&[f64]> {
        match &self.data {
            ArrayData::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Index lists, if this is an `index_lists` artifact.
    pub fn as_index_lists(&self) -> Option<&[Vec<usize>]> {
        match &self.data {
            ArrayData::IndexLists(v) => Some(v),
            _ => None,
        }
    }

    /// Strings, if this is a `str` artifact.
    pub fn as_str_list(&self) -> Option<&[String]> {
        match &self.data {
            ArrayData::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Bytes, if this is a `u8` artifact.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.data {
            ArrayData::U8(v) => Some(v),
            _ => None,
        }
    }
}

/// A directory of JSON artifacts addressed by relative name.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `root`; the directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the artifact `name` (relative, without extension).
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{ARTIFACT_EXTENSION}"))
    }

    /// Returns true if the artifact exists.
    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).exists()
    }

    /// Serializes `value` to the artifact `name` under the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArtifactConflict`] if the artifact exists and `mode`
    /// is [`WriteMode::CreateNew`]; the existing file is left unchanged.
    /// Returns [`Error::Io`] or [`Error::Json`] on other failures.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
        mode: WriteMode,
    ) -> Result<PathBuf> {
        let path = self.path_of(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(value)?;

        let mut options = OpenOptions::new();
        options.write(true);
        match mode {
            WriteMode::CreateNew => options.create_new(true),
            WriteMode::Overwrite => options.create(true).truncate(true),
        };
        let mut file = options.open(&path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::ArtifactConflict { path: path.clone() },
            _ => Error::Io(e),
        })?;
        file.write_all(&bytes)?;
        debug!("wrote artifact {}", path.display());
        Ok(path)
    }

    /// Reads the artifact `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPrerequisite`] if it does not exist, or
    /// [`Error::Io`] / [`Error::Json`] if it cannot be read or decoded.
    pub fn read<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.path_of(name);
        if !path.exists() {
            return Err(Error::MissingPrerequisite {
                what: format!("artifact {name}"),
                path,
            });
        }
        let bytes = fs::read(&path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Deletes the artifact `name`; returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file exists but cannot be removed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path_of(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("removed artifact {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Writes an [`ArrayArtifact`] under its own name.
    ///
    /// # Errors
    ///
    /// See [`ArtifactStore::write`].
    pub fn write_array(&self, artifact: &ArrayArtifact, mode: WriteMode) -> Result<PathBuf> {
        self.write(&artifact.name, artifact, mode)
    }

    /// Reads an [`ArrayArtifact`].
    ///
    /// # Errors
    ///
    /// See [`ArtifactStore::read`].
    pub fn read_array(&self, name: &str) -> Result<ArrayArtifact> {
        self.read(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_artifact_is_self_describing() -> Result<()> {
        let artifact = ArrayArtifact::vector("paths_deg", ArrayData::Str(vec!["l".into()]));
        let json = serde_json::to_value(&artifact)?;
        assert_eq!(json["dtype"], "str");
        assert_eq!(json["shape"], serde_json::json!([1]));
        assert_eq!(json["data"], serde_json::json!(["l"]));
        let back: ArrayArtifact = serde_json::from_value(json)?;
        assert_eq!(back, artifact);
        Ok(())
    }

    #[test]
    fn matrix_shape_is_rows_by_columns() {
        let m = ArrayArtifact::matrix("c", vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        assert_eq!(m.shape, vec![3, 2]);
        assert_eq!(m.as_f64().map(<[f64]>::len), Some(6));
    }

    #[test]
    fn remove_reports_whether_the_artifact_existed() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let store = ArtifactStore::new(dir.path());
        store.write("deg_tc/job_3", &[1, 2], WriteMode::CreateNew)?;
        assert!(store.remove("deg_tc/job_3")?);
        assert!(!store.exists("deg_tc/job_3"));
        assert!(!store.remove("deg_tc/job_3")?);
        Ok(())
    }

    #[test]
    fn write_mode_follows_flag() {
        assert_eq!(WriteMode::from_overwrite(true), WriteMode::Overwrite);
        assert_eq!(WriteMode::from_overwrite(false), WriteMode::CreateNew);
    }
}
