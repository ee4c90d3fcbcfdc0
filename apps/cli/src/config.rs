//! CLI configuration file support.
//!
//! Configuration precedence:
//! 1. CLI arguments (handled by clap)
//! 2. Environment variables (`CROPMASK_*`)
//! 3. Local config file (./.cropmaskrc)
//! 4. Global config file (~/.cropmask/config.toml)
//! 5. Defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const WORKSPACE_ENV: &str = "CROPMASK_WORKSPACE";
pub const MODELS_DIR_ENV: &str = "CROPMASK_MODELS_DIR";
pub const DATASETS_DIR_ENV: &str = "CROPMASK_DATASETS_DIR";

const DEFAULT_MODELS_DIR: &str = "data/models";
const DEFAULT_DATASETS_DIR: &str = "data/datasets";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Directory the process moves into before resolving relative paths.
    #[serde(default)]
    pub workspace: Option<PathBuf>,

    /// Where checkpoints are written and read.
    #[serde(default)]
    pub models_dir: Option<PathBuf>,

    /// Root of the JSONL label files.
    #[serde(default)]
    pub datasets_dir: Option<PathBuf>,

    /// Catalog TOML with regions, datasets and defaults.
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    #[serde(default)]
    pub log_level: Option<String>,
}

#[derive(Debug, Error)]
pub enum CliConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),
}

pub type CliConfigResult<T> = std::result::Result<T, CliConfigError>;

impl CliConfig {
    pub fn load_from_file(path: &Path) -> CliConfigResult<Self> {
        if !path.exists() {
            return Err(CliConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CliConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content).map_err(|e| CliConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    pub fn default_global_path() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".cropmask").join("config.toml")
    }

    /// Workspace used when none is configured: the cropmask home directory.
    pub fn default_workspace() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".cropmask"))
    }

    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".cropmaskrc")
    }

    /// Global config, then local config, then `CROPMASK_*` environment
    /// variables, each overriding the previous.
    ///
    /// Runs before logging is set up, so a file that exists but fails to
    /// parse is reported on stderr and otherwise ignored.
    pub fn discover_and_load() -> Self {
        let mut config = Self::default();

        for path in [Self::default_global_path(), Self::default_local_path()] {
            match Self::load_from_file(&path) {
                Ok(file_config) => config.merge(&file_config),
                Err(CliConfigError::NotFound(_)) => {}
                Err(e) => eprintln!("warning: ignoring configuration file: {e}"),
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref workspace) = other.workspace {
            self.workspace = Some(workspace.clone());
        }
        if let Some(ref models_dir) = other.models_dir {
            self.models_dir = Some(models_dir.clone());
        }
        if let Some(ref datasets_dir) = other.datasets_dir {
            self.datasets_dir = Some(datasets_dir.clone());
        }
        if let Some(ref catalog) = other.catalog {
            self.catalog = Some(catalog.clone());
        }
        if let Some(ref log_level) = other.log_level {
            self.log_level = Some(log_level.clone());
        }
    }

    /// Overlay `CROPMASK_*` variables; empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        if let Some(workspace) = get(WORKSPACE_ENV) {
            self.workspace = Some(workspace);
        }
        if let Some(models_dir) = get(MODELS_DIR_ENV) {
            self.models_dir = Some(models_dir);
        }
        if let Some(datasets_dir) = get(DATASETS_DIR_ENV) {
            self.datasets_dir = Some(datasets_dir);
        }
    }

    pub fn models_dir(&self) -> PathBuf {
        self.models_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_MODELS_DIR))
    }

    pub fn datasets_dir(&self) -> PathBuf {
        self.datasets_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DATASETS_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_load_and_merge() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        let local = temp.path().join("local.toml");
        std::fs::write(&global, "models_dir = \"/srv/models\"\nlog_level = \"debug\"\n").unwrap();
        std::fs::write(&local, "log_level = \"warn\"\ncatalog = \"regions.toml\"\n").unwrap();

        let mut config = CliConfig::default();
        config.merge(&CliConfig::load_from_file(&global).unwrap());
        config.merge(&CliConfig::load_from_file(&local).unwrap());

        assert_eq!(config.models_dir(), PathBuf::from("/srv/models"));
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert_eq!(config.catalog, Some(PathBuf::from("regions.toml")));
        assert_eq!(config.datasets_dir(), PathBuf::from("data/datasets"));
    }

    #[test]
    fn test_env_overrides_files() {
        let mut config = CliConfig { models_dir: Some(PathBuf::from("from-file")), ..Default::default() };
        let env: HashMap<&str, &str> = [(MODELS_DIR_ENV, "from-env"), (WORKSPACE_ENV, "  ")].into_iter().collect();
        config.apply_env(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.models_dir(), PathBuf::from("from-env"));
        assert_eq!(config.workspace, None);
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let temp = TempDir::new().unwrap();
        let missing = CliConfig::load_from_file(&temp.path().join("nope.toml"));
        assert!(matches!(missing, Err(CliConfigError::NotFound(_))));

        let bad = temp.path().join("bad.toml");
        std::fs::write(&bad, "models_dir = [").unwrap();
        assert!(matches!(CliConfig::load_from_file(&bad), Err(CliConfigError::ParseError(_))));
    }
}
