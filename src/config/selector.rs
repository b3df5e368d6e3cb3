//! Addressing a single cascade file by hierarchy level.

use std::path::PathBuf;
use tracing::debug;

use super::constants::{PLAIN_SUFFIX, SECRETS_SUFFIX};
use crate::context::ExecutionContext;
use crate::discovery::{list_environments, list_regions};
use crate::error::Result;

/// Selects the cascade file a read or write applies to.
///
/// Environment and region names are matched against discovered metadata names,
/// which may differ from their directory names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSelector {
    /// An explicit file.
    File(PathBuf),
    /// The `global` file at the root of the environments directory.
    Global,
    /// An environment's file.
    Environment {
        /// Environment name.
        environment: String,
    },
    /// A region's file.
    Region {
        /// Environment name.
        environment: String,
        /// Region name.
        region: String,
    },
    /// A module's file.
    Module {
        /// Environment name.
        environment: String,
        /// Region name.
        region: String,
        /// Module directory name.
        module: String,
    },
}

/// Where a selector points on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedPath {
    /// The addressed directory already exists as a discovered environment or region.
    Existing(PathBuf),
    /// Some part of the hierarchy has not been created yet.
    New(PathBuf),
}

impl SelectedPath {
    /// The file path regardless of whether it exists yet.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Existing(path) | Self::New(path) => path,
        }
    }

    /// Consumes the selection and returns the file path.
    #[must_use]
    pub fn into_path(self) -> PathBuf {
        match self {
            Self::Existing(path) | Self::New(path) => path,
        }
    }
}

impl ConfigSelector {
    /// Selects an environment.
    #[must_use]
    pub fn environment(environment: impl Into<String>) -> Self {
        Self::Environment {
            environment: environment.into(),
        }
    }

    /// Selects a region.
    #[must_use]
    pub fn region(environment: impl Into<String>, region: impl Into<String>) -> Self {
        Self::Region {
            environment: environment.into(),
            region: region.into(),
        }
    }

    /// Selects a module.
    #[must_use]
    pub fn module(
        environment: impl Into<String>,
        region: impl Into<String>,
        module: impl Into<String>,
    ) -> Self {
        Self::Module {
            environment: environment.into(),
            region: region.into(),
            module: module.into(),
        }
    }

    /// File name for this level, or `None` for an explicit file.
    #[must_use]
    pub fn file_name(&self, secret: bool) -> Option<String> {
        let stem = match self {
            Self::File(_) => return None,
            Self::Global => "global",
            Self::Environment { .. } => "environment",
            Self::Region { .. } => "region",
            Self::Module { .. } => "module",
        };
        let suffix = if secret { SECRETS_SUFFIX } else { PLAIN_SUFFIX };
        Some(format!("{stem}{suffix}"))
    }

    /// Resolves the file this selector addresses.
    ///
    /// Existing environments and regions are located through discovery; any
    /// missing part of the hierarchy is synthesized under the environments
    /// directory using the given names.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails.
    pub async fn locate(&self, ctx: &ExecutionContext, secret: bool) -> Result<SelectedPath> {
        let file_name = self.file_name(secret).unwrap_or_default();
        let selected = match self {
            Self::File(path) => SelectedPath::Existing(path.clone()),
            Self::Global => SelectedPath::Existing(ctx.environments_dir.join(&file_name)),
            Self::Environment { environment } => match environment_path(ctx, environment).await? {
                Some(env_path) => SelectedPath::Existing(env_path.join(&file_name)),
                None => SelectedPath::New(ctx.environments_dir.join(environment).join(&file_name)),
            },
            Self::Region { environment, region } => {
                locate_in_region(ctx, environment, region, &[], &file_name).await?
            }
            Self::Module {
                environment,
                region,
                module,
            } => locate_in_region(ctx, environment, region, &[module.as_str()], &file_name).await?,
        };

        debug!("Selector {self:?} points at {}", selected.path().display());
        Ok(selected)
    }
}

async fn environment_path(ctx: &ExecutionContext, environment: &str) -> Result<Option<PathBuf>> {
    Ok(list_environments(ctx)
        .await?
        .into_iter()
        .find(|env| env.name == environment)
        .map(|env| env.path))
}

async fn locate_in_region(
    ctx: &ExecutionContext,
    environment: &str,
    region: &str,
    below: &[&str],
    file_name: &str,
) -> Result<SelectedPath> {
    let join_below = |mut dir: PathBuf| {
        for part in below {
            dir.push(part);
        }
        dir.join(file_name)
    };

    let Some(env_path) = environment_path(ctx, environment).await? else {
        return Ok(SelectedPath::New(join_below(
            ctx.environments_dir.join(environment).join(region),
        )));
    };

    let region_path = list_regions(ctx, &env_path)
        .await?
        .into_iter()
        .find(|meta| meta.name == region)
        .map(|meta| meta.path);

    Ok(match region_path {
        Some(region_path) => SelectedPath::Existing(join_below(region_path)),
        None => SelectedPath::New(join_below(env_path.join(region))),
    })
}
