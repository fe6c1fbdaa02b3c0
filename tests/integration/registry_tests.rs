/*!
 * Integration tests for the project registry file
 */

use anyhow::Result;
use bitext::session::ProjectRegistry;
use std::path::PathBuf;
use crate::common;

#[test]
fn test_projectRegistry_load_withMissingFile_shouldBeEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let registry = ProjectRegistry::load(temp_dir.path().join("projects.json"))?;

    assert!(registry.projects().is_empty());
    assert!(registry.active().is_none());
    Ok(())
}

#[test]
fn test_projectRegistry_saveThenLoad_shouldKeepActiveProject() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("data").join("projects.json");

    let mut registry = ProjectRegistry::default();
    registry.add("novel", PathBuf::from("novel.org"), PathBuf::from("novel.json"))?;
    registry.add("essay", PathBuf::from("essay.org"), PathBuf::from("essay.json"))?;
    registry.activate("essay")?;
    registry.save(&path)?;

    let loaded = ProjectRegistry::load(&path)?;
    assert_eq!(loaded, registry);
    assert_eq!(loaded.active().unwrap().document_path, PathBuf::from("essay.org"));
    Ok(())
}

#[test]
fn test_projectRegistry_load_withCorruptFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "projects.json", "[1, 2")?;

    assert!(ProjectRegistry::load(&path).is_err());
    Ok(())
}
