use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

use crate::document::OutlineDocument;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load an outline document
    pub fn load_document<P: AsRef<Path>>(path: P) -> Result<OutlineDocument> {
        let text = Self::read_to_string(&path)?;
        debug!("Loaded {} bytes from {:?}", text.len(), path.as_ref());
        Ok(OutlineDocument::new(text))
    }

    /// Save an outline document, replacing the file
    pub fn save_document<P: AsRef<Path>>(path: P, document: &OutlineDocument) -> Result<()> {
        Self::write_to_file(&path, document.text())?;
        debug!("Saved {} bytes to {:?}", document.text().len(), path.as_ref());
        Ok(())
    }
}
