//! Cascade resolver.
//!
//! Resolution reads every cascade file name in every directory from the target
//! up to the repository root, concurrently, then merges by file-name rank once all
//! reads have completed. Completion order never affects the result.

use futures::future::try_join_all;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use super::constants::{CONFIG_FILE_PRECEDENCE, INVALID_SENTINEL, LOCAL_VERSION, is_secret_file};
use super::reader::ConfigReader;
use super::record::ConfigRecord;
use crate::context::ExecutionContext;
use crate::error::{ConfigError, Result};

/// Effective configuration for a directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    /// Merged and defaulted values.
    #[serde(flatten)]
    pub record: ConfigRecord,
    /// First path segment below the environments directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_dir: Option<String>,
    /// Second path segment below the environments directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_dir: Option<String>,
    /// Third path segment below the environments directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_dir: Option<String>,
}

/// One successful read: `(rank, depth, record)`.
type Contribution = (usize, usize, Option<ConfigRecord>);

/// Resolves the effective configuration of directories.
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver<'a> {
    ctx: &'a ExecutionContext,
    reader: ConfigReader<'a>,
}

impl<'a> ConfigResolver<'a> {
    /// Creates a resolver bound to an execution context.
    #[must_use]
    pub const fn new(ctx: &'a ExecutionContext) -> Self {
        Self {
            ctx,
            reader: ConfigReader::new(ctx),
        }
    }

    /// Resolves the effective configuration of `directory`.
    ///
    /// # Errors
    ///
    /// Returns an error if `directory` is relative or any file in the cascade is
    /// unreadable, malformed or cannot be decrypted.
    pub async fn resolve(&self, directory: &Path) -> Result<ResolvedConfig> {
        if !directory.is_absolute() {
            return Err(ConfigError::RelativePath {
                path: directory.to_path_buf(),
            }
            .into());
        }
        let directory = &normalize_path(directory);

        let dirs = self.cascade_dirs(directory);
        debug!("Resolving {} across {} directories", directory.display(), dirs.len());

        let mut record = self.merge(&dirs).await?;
        let parts = self.path_parts(directory);
        apply_defaults(&mut record, &parts);

        let mut resolved = ResolvedConfig {
            record,
            environment_dir: parts.first().cloned(),
            region_dir: parts.get(1).cloned(),
            module_dir: parts.get(2).cloned(),
        };

        if resolved.region_dir.is_some() {
            self.resolve_vault(&mut resolved.record).await;
        }

        info!("Resolved configuration for {}", directory.display());
        Ok(resolved)
    }

    /// Directories from `directory` up to and including the repository root.
    ///
    /// The filesystem root is only visited when it is the repository root.
    fn cascade_dirs(&self, directory: &Path) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for dir in directory.ancestors() {
            if dir == self.ctx.repo_root {
                dirs.push(dir.to_path_buf());
                break;
            }
            if dir.parent().is_none() {
                break;
            }
            dirs.push(dir.to_path_buf());
        }
        dirs
    }

    async fn merge(&self, dirs: &[PathBuf]) -> Result<ConfigRecord> {
        let reads = dirs.iter().enumerate().flat_map(|(depth, dir)| {
            CONFIG_FILE_PRECEDENCE
                .iter()
                .enumerate()
                .map(move |(rank, name)| self.read_one(rank, depth, dir.join(name), is_secret_file(name)))
        });
        let contributions = try_join_all(reads).await?;

        // Per rank, the directory closest to the target wins.
        let mut by_rank: [Option<(usize, ConfigRecord)>; CONFIG_FILE_PRECEDENCE.len()] = Default::default();
        for (rank, depth, record) in contributions {
            let Some(record) = record else { continue };
            let slot = &mut by_rank[rank];
            if slot.as_ref().is_none_or(|(current, _)| depth < *current) {
                *slot = Some((depth, record));
            }
        }

        Ok(by_rank
            .into_iter()
            .flatten()
            .fold(ConfigRecord::default(), |acc, (_, record)| acc.merged_with(record)))
    }

    async fn read_one(&self, rank: usize, depth: usize, path: PathBuf, secret: bool) -> Result<Contribution> {
        let record = self.reader.read(&path, secret).await?;
        Ok((rank, depth, record))
    }

    /// Path segments of `directory` below the environments directory.
    fn path_parts(&self, directory: &Path) -> Vec<String> {
        directory
            .strip_prefix(&self.ctx.environments_dir)
            .map(|relative| {
                relative
                    .components()
                    .filter_map(|component| match component {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn resolve_vault(&self, record: &mut ConfigRecord) {
        let ambient = &self.ctx.ambient;
        let configured = record.vault_addr.take().filter(|addr| !addr.is_empty());
        let address = if ambient.ci {
            ambient.vault_addr.clone()
        } else {
            configured.or_else(|| ambient.vault_addr.clone())
        }
        .unwrap_or_else(|| String::from(INVALID_SENTINEL));

        if record.vault_token.is_none() {
            let token = if address == INVALID_SENTINEL {
                String::from(INVALID_SENTINEL)
            } else {
                match self.ctx.tokens.fetch_token(&address, true, true).await {
                    Ok(token) => token,
                    Err(e) => {
                        warn!("Unable to get Vault token for {address}: {e}");
                        String::from(INVALID_SENTINEL)
                    }
                }
            };
            record.vault_token = Some(token);
        }
        record.vault_addr = Some(address);
    }
}

/// Removes `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the root of an absolute path.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(Component::ParentDir),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

fn apply_defaults(record: &mut ConfigRecord, parts: &[String]) {
    if record.tf_state_account_id.is_none() {
        record.tf_state_account_id.clone_from(&record.aws_account_id);
    }
    if record.tf_state_profile.is_none() {
        record.tf_state_profile.clone_from(&record.aws_profile);
    }
    if record.aws_secondary_account_id.is_none() {
        record.aws_secondary_account_id.clone_from(&record.aws_account_id);
    }
    if record.aws_secondary_profile.is_none() {
        record.aws_secondary_profile.clone_from(&record.aws_profile);
    }
    record.pf_stack_local_use_relative.get_or_insert(true);
    record.extra_tags.get_or_insert_with(Default::default);
    record.extra_inputs.get_or_insert_with(Default::default);

    if let Some(part) = parts.first() {
        record.environment.get_or_insert_with(|| part.clone());
    }
    if let Some(part) = parts.get(1) {
        record.region.get_or_insert_with(|| part.clone());
    }
    if let Some(part) = parts.get(2) {
        record.module.get_or_insert_with(|| part.clone());
    }

    if record.kube_name.is_none() {
        record.kube_name = match (&record.kube_config_context, &record.environment, &record.region) {
            (Some(context), _, _) => Some(context.clone()),
            (None, Some(environment), Some(region)) if parts.len() >= 2 => {
                Some(format!("{environment}-{region}"))
            }
            _ => None,
        };
    }
    if record.kube_config_context.is_none() {
        record.kube_config_context.clone_from(&record.kube_name);
    }
    record.version.get_or_insert_with(|| String::from(LOCAL_VERSION));
}
