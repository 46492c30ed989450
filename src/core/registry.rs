//! Workflow definitions and the file-backed registry.
//!
//! Each definition is a YAML document at `<workflows_dir>/<name>.yaml`
//! holding the workflow's states and transitions plus the tramline layout
//! (critical path and alternates).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{AlternatesMap, CriticalPath, Workflow};

use super::engine::TramlineEngine;

/// Critical path and alternates for a workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TramlineLayout {
    #[serde(default, alias = "criticalPath")]
    pub critical_path: CriticalPath,

    #[serde(default, alias = "alternatesMap")]
    pub alternates: AlternatesMap,
}

/// A complete workflow definition document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Workflow name (used in CLI)
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// States and transitions
    #[serde(flatten)]
    pub workflow: Workflow,

    /// How the workflow is drawn as a trail
    #[serde(default)]
    pub tramline: TramlineLayout,
}

impl WorkflowDefinition {
    /// Load a definition from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            RegistryError::Parse { source, .. } => RegistryError::Parse {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })
    }

    /// Parse a definition from YAML content
    pub fn from_yaml(content: &str) -> Result<Self, RegistryError> {
        let mut definition: Self = serde_yaml::from_str(content)
            .map_err(|source| RegistryError::Parse { path: None, source })?;
        definition.workflow.normalize_names();
        Ok(definition)
    }

    /// Engine bound to this definition
    pub fn engine(&self) -> TramlineEngine<'_> {
        TramlineEngine::new(
            &self.workflow,
            &self.tramline.critical_path,
            &self.tramline.alternates,
        )
    }
}

/// Registry loading errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Workflow not found: {name} (looked in {})", .dir.display())]
    NotFound { name: String, dir: PathBuf },

    #[error("Invalid workflow name: {0}")]
    InvalidName(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse workflow definition{}: {source}", display_path(.path))]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: serde_yaml::Error,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

/// Directory of workflow definitions
#[derive(Debug, Clone)]
pub struct WorkflowRegistry {
    dir: PathBuf,
}

impl WorkflowRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Registry at the configured workflows directory
    pub fn from_config() -> anyhow::Result<Self> {
        Ok(Self::new(crate::config::workflows_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a definition would live at
    pub fn path_for(&self, name: &str) -> Result<PathBuf, RegistryError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.yaml", name)))
    }

    /// Load a definition by name
    pub fn load(&self, name: &str) -> Result<WorkflowDefinition, RegistryError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(RegistryError::NotFound {
                name: name.to_string(),
                dir: self.dir.clone(),
            });
        }

        debug!(path = %path.display(), "Loading workflow definition");
        let definition = WorkflowDefinition::from_file(&path)?;

        if definition.name != name {
            warn!(
                file = name,
                declared = %definition.name,
                "Workflow name does not match its file name"
            );
        }

        Ok(definition)
    }

    /// Names of all definitions in the registry, sorted
    pub fn list(&self) -> Result<Vec<String>, RegistryError> {
        let mut names = Vec::new();

        if !self.dir.exists() {
            return Ok(names);
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|source| RegistryError::Io {
            path: self.dir.clone(),
            source,
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
