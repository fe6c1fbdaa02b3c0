/*!
 * Registry of known projects.
 *
 * A small JSON file mapping project names to their document and
 * configuration files. At most one project is active at a time.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;

/// One registered project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Unique project name
    pub name: String,
    /// Outline document holding the three streams
    pub document_path: PathBuf,
    /// Configuration file of the project
    pub config_path: PathBuf,
    /// Whether this is the active project
    #[serde(default)]
    pub active: bool,
}

/// All registered projects, in registration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRegistry {
    #[serde(default)]
    projects: Vec<ProjectRecord>,
}

impl ProjectRegistry {
    /// Default registry location under the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow!("Could not determine the local data directory"))?;
        Ok(data_dir.join("bitext").join("projects.json"))
    }

    /// Load the registry at `path`; a missing file is an empty registry
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !FileManager::file_exists(path) {
            debug!("No project registry at {:?}, starting empty", path);
            return Ok(Self::default());
        }
        let content = FileManager::read_to_string(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse project registry: {:?}", path))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize project registry")?;
        FileManager::write_to_file(path, &json)
    }

    pub fn projects(&self) -> &[ProjectRecord] {
        &self.projects
    }

    pub fn get(&self, name: &str) -> Option<&ProjectRecord> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Register a new project (inactive)
    pub fn add(&mut self, name: &str, document_path: PathBuf, config_path: PathBuf) -> Result<&ProjectRecord> {
        if self.get(name).is_some() {
            return Err(anyhow!("A project named '{}' is already registered", name));
        }
        self.projects.push(ProjectRecord {
            name: name.to_string(),
            document_path,
            config_path,
            active: false,
        });
        info!("Registered project '{}'", name);
        let index = self.projects.len() - 1;
        Ok(&self.projects[index])
    }

    /// Make `name` the only active project
    pub fn activate(&mut self, name: &str) -> Result<&ProjectRecord> {
        let index = self
            .projects
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| anyhow!("Unknown project '{}'", name))?;
        for (i, project) in self.projects.iter_mut().enumerate() {
            project.active = i == index;
        }
        Ok(&self.projects[index])
    }

    /// Deactivate whichever project is active
    pub fn deactivate(&mut self) -> Option<String> {
        let active = self.projects.iter_mut().find(|p| p.active)?;
        active.active = false;
        Some(active.name.clone())
    }

    pub fn active(&self) -> Option<&ProjectRecord> {
        self.projects.iter().find(|p| p.active)
    }

    pub fn remove(&mut self, name: &str) -> Result<ProjectRecord> {
        let index = self
            .projects
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| anyhow!("Unknown project '{}'", name))?;
        Ok(self.projects.remove(index))
    }
}
