//! Repository-level variables.
//!
//! The repository root is the closest ancestor containing `.git`. Its
//! `panfactum.yaml` is overlaid key by key with the optional, untracked
//! `panfactum.user.yaml` before validation.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};

/// Repository configuration file.
pub const REPO_CONFIG_FILE: &str = "panfactum.yaml";

/// Per-user overrides of the repository configuration file.
pub const REPO_USER_CONFIG_FILE: &str = "panfactum.user.yaml";

/// Marker identifying the repository root.
const REPO_ROOT_MARKER: &str = ".git";

/// Accepted prefixes of `repo_url`.
const REPO_URL_PREFIXES: &[&str] = &["git::https://", "github.com", "bitbucket.org"];

/// Raw contents of the repository configuration files.
#[derive(Debug, Deserialize)]
struct RepoFile {
    repo_name: String,
    repo_primary_branch: String,
    repo_url: String,
    #[serde(default = "default_environments_dir")]
    environments_dir: String,
    #[serde(default = "default_iac_dir")]
    iac_dir: String,
}

fn default_environments_dir() -> String {
    String::from("environments")
}

fn default_iac_dir() -> String {
    String::from("infrastructure")
}

/// Validated repository variables with directories resolved against the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoVariables {
    /// Absolute repository root.
    pub repo_root: PathBuf,
    /// Repository name.
    pub repo_name: String,
    /// Primary branch.
    pub repo_primary_branch: String,
    /// Module source URL of the repository.
    pub repo_url: String,
    /// Absolute environments directory.
    pub environments_dir: PathBuf,
    /// Absolute infrastructure-as-code directory.
    pub iac_dir: PathBuf,
}

impl RepoVariables {
    /// Locates the repository above `start` and loads its variables.
    ///
    /// # Errors
    ///
    /// Returns an error if no repository root is found, the configuration file is
    /// missing or invalid, or a directory setting is malformed.
    pub fn load(start: impl AsRef<Path>) -> Result<Self> {
        let repo_root = find_repo_root(start.as_ref())?;
        Self::load_from_root(repo_root)
    }

    /// Loads the variables of a known repository root.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is missing or invalid.
    pub fn load_from_root(repo_root: impl Into<PathBuf>) -> Result<Self> {
        let repo_root = repo_root.into();
        let config_path = repo_root.join(REPO_CONFIG_FILE);
        if !config_path.is_file() {
            return Err(ConfigError::RepoConfigMissing { path: config_path }.into());
        }

        info!("Loading repository variables from {}", config_path.display());
        let mut values = read_mapping(&config_path)?;

        let user_path = repo_root.join(REPO_USER_CONFIG_FILE);
        if user_path.is_file() {
            debug!("Applying user overrides from {}", user_path.display());
            values.extend(read_mapping(&user_path)?);
        }

        let file: RepoFile = serde_yaml::from_value(serde_yaml::Value::Mapping(values))
            .map_err(|e| ConfigError::validation(&config_path, e.to_string()))?;

        if !REPO_URL_PREFIXES.iter().any(|prefix| file.repo_url.starts_with(prefix)) {
            return Err(ConfigError::validation(
                &config_path,
                "repo_url must be a valid module source that uses HTTPS",
            )
            .into());
        }
        check_relative_dir(&config_path, "environments_dir", &file.environments_dir)?;
        check_relative_dir(&config_path, "iac_dir", &file.iac_dir)?;

        Ok(Self {
            environments_dir: repo_root.join(&file.environments_dir),
            iac_dir: repo_root.join(&file.iac_dir),
            repo_root,
            repo_name: file.repo_name,
            repo_primary_branch: file.repo_primary_branch,
            repo_url: file.repo_url,
        })
    }
}

/// Returns the closest ancestor of `start` (inclusive) that contains `.git`.
///
/// # Errors
///
/// Returns an error if no ancestor qualifies.
pub fn find_repo_root(start: &Path) -> Result<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(REPO_ROOT_MARKER).exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            ConfigError::RepoRootNotFound {
                start: start.to_path_buf(),
            }
            .into()
        })
}

fn read_mapping(path: &Path) -> Result<serde_yaml::Mapping> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    let value: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| ConfigError::InvalidYaml {
        path: path.to_path_buf(),
        source: e,
    })?;

    match value {
        serde_yaml::Value::Mapping(mapping) => Ok(mapping),
        serde_yaml::Value::Null => Ok(serde_yaml::Mapping::new()),
        _ => Err(ConfigError::validation(path, "expected a mapping at the top level").into()),
    }
}

fn check_relative_dir(path: &Path, key: &str, dir: &str) -> Result<()> {
    if dir.starts_with('/') {
        return Err(ConfigError::validation(path, format!("{key} must not contain a leading /")).into());
    }
    if dir.ends_with('/') {
        return Err(ConfigError::validation(path, format!("{key} must not contain a trailing /")).into());
    }
    Ok(())
}
