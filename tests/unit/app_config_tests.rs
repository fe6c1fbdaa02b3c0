/*!
 * Tests for application configuration loading and saving
 */

use anyhow::Result;
use bitext::app_config::{Config, LogLevel};
use bitext::document::SectionId;
use bitext::locator::Locator;
use bitext::segmentation::SegmentationStrategy;
use crate::common;

/// A missing config file is created with the defaults
#[test]
fn test_config_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf").join("bitext.json");

    let config = Config::load_or_create(&path)?;

    assert_eq!(config, Config::default());
    assert!(path.exists());
    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(written["project"]["source"]["by"], "tag");
    assert_eq!(written["project"]["delimiter"], "❡");
    Ok(())
}

#[test]
fn test_config_saveThenLoad_shouldPreserveProjectSettings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("bitext.json");

    let mut config = Config::default();
    config.target_language = "de".to_string();
    config.log_level = LogLevel::Debug;
    config.project.source = Locator::stable(SectionId::new("abc"));
    config.project.strategy = SegmentationStrategy::Paragraph;
    config.save(&path)?;

    let loaded = Config::load_or_create(&path)?;
    assert_eq!(loaded, config);
    Ok(())
}

#[test]
fn test_config_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "bitext.json", "{ not json")?;

    let error = Config::load_or_create(&path).unwrap_err();
    assert!(error.to_string().contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_config_propertyLocator_shouldDeserialize() -> Result<()> {
    let json = r#"{
        "source_language": "ja",
        "target_language": "en",
        "project": {
            "glossary": { "by": "property", "name": "ROLE", "value": "glossary" },
            "segment_translation": false
        },
        "log_level": "warn"
    }"#;
    let config: Config = serde_json::from_str(json)?;

    assert_eq!(config.project.glossary, Locator::property("ROLE", "glossary"));
    assert!(!config.project.segment_translation);
    assert_eq!(config.log_level, LogLevel::Warn);
    assert!(config.validate().is_ok());
    Ok(())
}
