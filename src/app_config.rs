use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::file_utils::FileManager;
use crate::locator::Locator;
use crate::segmentation::{Segmenter, SegmentationStrategy};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Project layout and segmentation settings
    #[serde(default)]
    pub project: ProjectConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Per-project settings: where the three streams live and how to segment them
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProjectConfig {
    // @field: Locator of the source stream
    #[serde(default = "default_source_locator")]
    pub source: Locator,

    // @field: Locator of the translation stream
    #[serde(default = "default_translation_locator")]
    pub translation: Locator,

    // @field: Locator of the glossary
    #[serde(default = "default_glossary_locator")]
    pub glossary: Locator,

    // @field: Segmentation strategy
    #[serde(default)]
    pub strategy: SegmentationStrategy,

    // @field: Segment delimiter character
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    // @field: Segment the translation stream along with the source
    #[serde(default = "default_true")]
    pub segment_translation: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source: default_source_locator(),
            translation: default_translation_locator(),
            glossary: default_glossary_locator(),
            strategy: SegmentationStrategy::default(),
            delimiter: default_delimiter(),
            segment_translation: default_true(),
        }
    }
}

impl ProjectConfig {
    /// Replace the three locators by the durable identifiers they resolved to,
    /// so later activations no longer depend on tags or titles
    pub fn pin_roots(&mut self, roots: &crate::locator::ProjectRoots) {
        self.source = Locator::stable(roots.source.clone());
        self.translation = Locator::stable(roots.translation.clone());
        self.glossary = Locator::stable(roots.glossary.clone());
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_locator() -> Locator {
    Locator::tag("source")
}

fn default_translation_locator() -> Locator {
    Locator::tag("translation")
}

fn default_glossary_locator() -> Locator {
    Locator::tag("glossary")
}

fn default_delimiter() -> char {
    '❡'
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if crate::language_utils::language_codes_match(&self.source_language, &self.target_language) {
            warn!(
                "Source and target languages are the same ({}), is this intended?",
                self.source_language
            );
        }

        // Strategy regex and delimiter
        Segmenter::new(&self.project.strategy, self.project.delimiter)
            .map_err(|e| anyhow!("Invalid project settings: {}", e))?;

        Ok(())
    }

    /// Load the configuration at `path`, writing a default one if the file is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        FileManager::write_to_file(path, &config_json)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "fr".to_string(),
            project: ProjectConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
