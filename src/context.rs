//! Execution context passed into every cascade operation.
//!
//! Ambient process state (CI detection, Vault variables) is captured once into
//! [`AmbientEnv`] so the resolver never reads process globals itself.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::repo::RepoVariables;
use crate::secrets::{SecretStore, SopsCli};
use crate::status::{FileStatusProbe, ModuleStatusProbe};
use crate::vault::{TokenFetcher, VaultCli};

/// Ambient environment variables consulted by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbientEnv {
    /// Running in continuous integration.
    pub ci: bool,
    /// `VAULT_ADDR`, if set and non-empty.
    pub vault_addr: Option<String>,
    /// `VAULT_TOKEN`, if set and non-empty.
    pub vault_token: Option<String>,
}

impl AmbientEnv {
    /// Captures the ambient variables of the current process.
    #[must_use]
    pub fn from_process_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|value| !value.is_empty());
        Self {
            ci: var("CI").is_some_and(|value| value == "true" || value == "1"),
            vault_addr: var("VAULT_ADDR"),
            vault_token: var("VAULT_TOKEN"),
        }
    }
}

/// Everything a cascade operation needs besides its arguments.
#[derive(Clone)]
pub struct ExecutionContext {
    /// Repository root; the cascade walk never goes above it.
    pub repo_root: PathBuf,
    /// Absolute environments directory.
    pub environments_dir: PathBuf,
    /// Ambient environment variables.
    pub ambient: AmbientEnv,
    /// Decrypt and encrypt-and-write collaborator.
    pub secrets: Arc<dyn SecretStore>,
    /// Vault token collaborator.
    pub tokens: Arc<dyn TokenFetcher>,
    /// Module status collaborator.
    pub status: Arc<dyn ModuleStatusProbe>,
}

impl ExecutionContext {
    /// Creates a context backed by the `sops` and `vault` CLIs and status files.
    #[must_use]
    pub fn new(repo: RepoVariables, ambient: AmbientEnv) -> Self {
        let tokens = VaultCli::new(ambient.vault_token.clone(), repo.repo_root.clone());
        let status = FileStatusProbe::new(repo.environments_dir.clone());
        Self {
            repo_root: repo.repo_root,
            environments_dir: repo.environments_dir,
            ambient,
            secrets: Arc::new(SopsCli::new()),
            tokens: Arc::new(tokens),
            status: Arc::new(status),
        }
    }

    /// Replaces the secret store.
    #[must_use]
    pub fn with_secret_store(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = secrets;
        self
    }

    /// Replaces the token fetcher.
    #[must_use]
    pub fn with_token_fetcher(mut self, tokens: Arc<dyn TokenFetcher>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Replaces the module status probe.
    #[must_use]
    pub fn with_status_probe(mut self, status: Arc<dyn ModuleStatusProbe>) -> Self {
        self.status = status;
        self
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("repo_root", &self.repo_root)
            .field("environments_dir", &self.environments_dir)
            .field("ambient", &self.ambient)
            .finish_non_exhaustive()
    }
}

/// Fixtures shared by the cascade tests.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;

    use crate::config::ConfigRecord;
    use crate::error::{ConfigError, Result};
    use crate::status::{MockModuleStatusProbe, ModuleStatus};
    use crate::vault::MockTokenFetcher;

    /// Secret store that keeps "encrypted" files as plain YAML.
    #[derive(Debug, Default)]
    pub struct PlaintextSecrets;

    #[async_trait]
    impl SecretStore for PlaintextSecrets {
        async fn decrypt(&self, path: &Path) -> Result<Option<serde_yaml::Value>> {
            match tokio::fs::read_to_string(path).await {
                Ok(content) => Ok(Some(serde_yaml::from_str(&content).map_err(|e| {
                    ConfigError::InvalidYaml {
                        path: path.to_path_buf(),
                        source: e,
                    }
                })?)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        }

        async fn encrypt_write(&self, path: &Path, record: &ConfigRecord, _overwrite: bool) -> Result<()> {
            let content = serde_yaml::to_string(record).map_err(|e| crate::error::PfError::internal(e.to_string()))?;
            if let Some(dir) = path.parent() {
                tokio::fs::create_dir_all(dir).await?;
            }
            tokio::fs::write(path, content).await?;
            Ok(())
        }
    }

    /// Token fetcher that always returns `test-token`.
    pub fn token_fetcher() -> MockTokenFetcher {
        let mut tokens = MockTokenFetcher::new();
        tokens
            .expect_fetch_token()
            .returning(|_, _, _| Ok(String::from("test-token")));
        tokens
    }

    /// Status probe reporting every module as undeployed.
    pub fn undeployed_probe() -> MockModuleStatusProbe {
        let mut status = MockModuleStatusProbe::new();
        status
            .expect_status()
            .returning(|_, _, _| Ok(ModuleStatus::default()));
        status
    }

    /// Context rooted at `root` with `environments` as the environments directory.
    pub fn context(root: &Path) -> ExecutionContext {
        ExecutionContext {
            repo_root: root.to_path_buf(),
            environments_dir: root.join("environments"),
            ambient: AmbientEnv::default(),
            secrets: Arc::new(PlaintextSecrets),
            tokens: Arc::new(token_fetcher()),
            status: Arc::new(undeployed_probe()),
        }
    }

    /// Writes `content` to `root/relative`, creating parent directories.
    pub fn write_yaml(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).expect("Failed to create fixture dir");
        }
        std::fs::write(path, content).expect("Failed to write fixture");
    }
}
