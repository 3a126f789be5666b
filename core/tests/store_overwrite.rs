//! Guarded-overwrite behavior of the artifact store.

use std::fs;

use binsplit_core::store::{ArrayArtifact, ArrayData, ArtifactStore, WriteMode};
use binsplit_core::{Error, Result};
use tempfile::TempDir;

#[test]
fn conflict_leaves_existing_bytes_unchanged() -> Result<()> {
    let dir = TempDir::new()?;
    let store = ArtifactStore::new(dir.path());
    let first = ArrayArtifact::vector("bins_deg", ArrayData::IndexLists(vec![vec![0, 2], vec![1]]));
    let path = store.write_array(&first, WriteMode::CreateNew)?;
    let before = fs::read(&path)?;

    let second = ArrayArtifact::vector("bins_deg", ArrayData::IndexLists(vec![vec![0, 1, 2]]));
    let err = store.write_array(&second, WriteMode::CreateNew);
    assert!(matches!(err, Err(Error::ArtifactConflict { path: p }) if p == path));
    assert_eq!(fs::read(&path)?, before);
    assert_eq!(store.read_array("bins_deg")?, first);
    Ok(())
}

#[test]
fn overwrite_replaces_content() -> Result<()> {
    let dir = TempDir::new()?;
    let store = ArtifactStore::new(dir.path());
    let long = ArrayArtifact::vector("noise_deg_deg", ArrayData::F64(vec![0.25; 64]));
    store.write_array(&long, WriteMode::CreateNew)?;

    let short = ArrayArtifact::vector("noise_deg_deg", ArrayData::F64(vec![-0.5]));
    store.write_array(&short, WriteMode::Overwrite)?;
    assert_eq!(store.read_array("noise_deg_deg")?, short);
    Ok(())
}

#[test]
fn nested_names_create_directories() -> Result<()> {
    let dir = TempDir::new()?;
    let store = ArtifactStore::new(dir.path().join("parameters"));
    let mask = ArrayArtifact::vector("deg-rc/mask_deg-rc_4", ArrayData::U8(vec![0, 1, 1]));
    let path = store.write_array(&mask, WriteMode::CreateNew)?;
    assert_eq!(path, dir.path().join("parameters/deg-rc/mask_deg-rc_4.json"));
    assert_eq!(store.read_array("deg-rc/mask_deg-rc_4")?.as_u8(), Some(&[0u8, 1, 1][..]));
    Ok(())
}

#[test]
fn reading_an_absent_artifact_names_the_path() -> Result<()> {
    let dir = TempDir::new()?;
    let store = ArtifactStore::new(dir.path());
    let err = store.read_array("bins_missing");
    assert!(matches!(
        err,
        Err(Error::MissingPrerequisite { path, .. }) if path == dir.path().join("bins_missing.json")
    ));
    Ok(())
}
