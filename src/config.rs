//! Configuration for tramline.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (TRAMLINE_HOME, TRAMLINE_WORKFLOWS)
//! 2. Config file (.tramline/config.yaml)
//! 3. Defaults (~/.tramline)
//!
//! Config file discovery:
//! - Searches current directory and parents for .tramline/config.yaml
//! - Paths in config file are relative to the project root (the parent of .tramline/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Tramline home directory (relative to .tramline/)
    pub home: Option<String>,
    /// Workflow definitions directory (relative to the project root)
    pub workflows: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    pub fallback_to_now: Option<bool>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to tramline home
    pub home: PathBuf,
    /// Absolute path to the workflow definitions directory
    pub workflows: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Display settings
    pub display: DisplaySettings,
}

#[derive(Debug, Clone)]
pub struct DisplaySettings {
    /// Use the current time as the fallback timestamp when none is given
    pub fallback_to_now: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            fallback_to_now: true,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".tramline").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to a base directory
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".tramline");

    let config_file = find_config_file();

    let (home, workflows, display) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // .tramline/ and the project root above it
        let tramline_dir = config_path.parent().unwrap_or(Path::new("."));
        let base_dir = tramline_dir.parent().unwrap_or(Path::new("."));

        let home = if let Ok(env_home) = std::env::var("TRAMLINE_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            resolve_path(tramline_dir, home_path)
        } else {
            default_home.clone()
        };

        let workflows = if let Ok(env_workflows) = std::env::var("TRAMLINE_WORKFLOWS") {
            PathBuf::from(env_workflows)
        } else if let Some(ref workflows_path) = config.paths.workflows {
            resolve_path(base_dir, workflows_path)
        } else {
            home.join("workflows")
        };

        let display = DisplaySettings {
            fallback_to_now: config
                .display
                .as_ref()
                .and_then(|d| d.fallback_to_now)
                .unwrap_or(true),
        };

        (home, workflows, display)
    } else {
        let home = std::env::var("TRAMLINE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home.clone());

        let workflows = std::env::var("TRAMLINE_WORKFLOWS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join("workflows"));

        (home, workflows, DisplaySettings::default())
    };

    Ok(ResolvedConfig {
        home,
        workflows,
        config_file,
        display,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Get the workflow definitions directory
pub fn workflows_dir() -> Result<PathBuf> {
    Ok(config()?.workflows.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let tramline_dir = temp.path().join(".tramline");
        std::fs::create_dir_all(&tramline_dir).unwrap();

        let config_path = tramline_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  home: ./
  workflows: ./workflows
display:
  fallback_to_now: false
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./".to_string()));
        assert_eq!(config.paths.workflows, Some("./workflows".to_string()));
        assert_eq!(config.display.unwrap().fallback_to_now, Some(false));
    }

    #[test]
    fn test_minimal_config_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        std::fs::write(&config_path, "version: \"1.0\"\n").unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert!(config.paths.workflows.is_none());
        assert!(config.display.is_none());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_display_defaults() {
        assert!(DisplaySettings::default().fallback_to_now);
    }
}
