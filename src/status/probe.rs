//! Module status probe trait and the file-backed implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::config::constants::MODULE_STATUS_FILE;
use crate::error::{ConfigError, Result};

/// Initialization state of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitStatus {
    /// Never initialized.
    #[default]
    Uninited,
    /// Initialization in progress.
    Running,
    /// Initialized.
    Success,
    /// Initialization failed.
    Error,
}

/// Deployment state of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployStatus {
    /// Never deployed.
    #[default]
    Undeployed,
    /// Deployment in progress.
    Running,
    /// Deployed.
    Success,
    /// Deployment failed.
    Error,
}

/// Status of one module in one region of one environment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleStatus {
    /// The environment directory exists.
    pub environment_exists: bool,
    /// The region directory exists.
    pub region_exists: bool,
    /// The module directory exists.
    pub module_exists: bool,
    /// Initialization state.
    pub init_status: InitStatus,
    /// Deployment state.
    pub deploy_status: DeployStatus,
}

impl ModuleStatus {
    /// Returns true if the module is successfully deployed.
    #[must_use]
    pub fn is_deployed(&self) -> bool {
        self.deploy_status == DeployStatus::Success
    }
}

/// Contents of a module status file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StatusFile {
    #[serde(default)]
    init_status: InitStatus,
    #[serde(default)]
    deploy_status: DeployStatus,
}

/// Reports the deployment status of a module.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ModuleStatusProbe: Send + Sync {
    /// Returns the status of `module` in `environment`/`region`.
    async fn status(&self, environment: &str, region: &str, module: &str) -> Result<ModuleStatus>;
}

/// Probe that reads the status file kept in each module directory.
#[derive(Debug, Clone)]
pub struct FileStatusProbe {
    /// Root of the environments tree.
    environments_dir: PathBuf,
}

impl FileStatusProbe {
    /// Creates a probe rooted at the environments directory.
    #[must_use]
    pub fn new(environments_dir: impl Into<PathBuf>) -> Self {
        Self {
            environments_dir: environments_dir.into(),
        }
    }

    async fn read_status_file(path: &Path) -> Result<StatusFile> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StatusFile::default()),
            Err(e) => {
                return Err(ConfigError::ReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
                .into());
            }
        };
        if content.trim().is_empty() {
            return Ok(StatusFile::default());
        }

        let status: Option<StatusFile> =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::InvalidYaml {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(status.unwrap_or_default())
    }
}

#[async_trait]
impl ModuleStatusProbe for FileStatusProbe {
    async fn status(&self, environment: &str, region: &str, module: &str) -> Result<ModuleStatus> {
        let env_dir = self.environments_dir.join(environment);
        let region_dir = env_dir.join(region);
        let module_dir = region_dir.join(module);

        if !fs::try_exists(&module_dir).await? {
            let region_exists = fs::try_exists(&region_dir).await?;
            let environment_exists = region_exists || fs::try_exists(&env_dir).await?;
            return Ok(ModuleStatus {
                environment_exists,
                region_exists,
                ..ModuleStatus::default()
            });
        }

        debug!("Reading module status in {}", module_dir.display());
        let file = Self::read_status_file(&module_dir.join(MODULE_STATUS_FILE)).await?;
        Ok(ModuleStatus {
            environment_exists: true,
            region_exists: true,
            module_exists: true,
            init_status: file.init_status,
            deploy_status: file.deploy_status,
        })
    }
}
