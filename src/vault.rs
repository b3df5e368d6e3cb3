//! Vault token retrieval.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::config::constants::INVALID_SENTINEL;
use crate::error::{CollaboratorError, Result};

/// Fetches a Vault token for an address.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Returns a token valid for `address`.
    ///
    /// `silent` suppresses tool output; `noop` forbids starting an interactive
    /// login when no cached token is available.
    async fn fetch_token(&self, address: &str, silent: bool, noop: bool) -> Result<String>;
}

/// Token fetcher backed by the `vault` CLI.
#[derive(Debug, Clone)]
pub struct VaultCli {
    /// Token already present in the ambient environment.
    ambient_token: Option<String>,
    /// Directory the CLI runs in.
    working_dir: PathBuf,
}

impl VaultCli {
    /// Creates a fetcher. An `ambient_token` short-circuits every lookup.
    #[must_use]
    pub fn new(ambient_token: Option<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            ambient_token,
            working_dir: working_dir.into(),
        }
    }

    async fn run(&self, address: &str, args: &[&str], silent: bool) -> Result<Option<String>> {
        let output = Command::new("vault")
            .args(args)
            .env("VAULT_ADDR", address)
            .current_dir(&self.working_dir)
            .stdin(if silent { Stdio::null() } else { Stdio::inherit() })
            .stderr(if silent { Stdio::null() } else { Stdio::inherit() })
            .output()
            .await
            .map_err(|e| CollaboratorError::token(address, format!("failed to run vault: {e}")))?;

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((output.status.success() && !token.is_empty()).then_some(token))
    }
}

#[async_trait]
impl TokenFetcher for VaultCli {
    async fn fetch_token(&self, address: &str, silent: bool, noop: bool) -> Result<String> {
        if address == INVALID_SENTINEL {
            return Err(CollaboratorError::token(address, "Vault address is not set").into());
        }
        if let Some(token) = &self.ambient_token {
            return Ok(token.clone());
        }

        debug!("Looking up cached Vault token for {address}");
        if let Some(token) = self.run(address, &["print", "token"], silent).await? {
            return Ok(token);
        }
        if noop {
            return Err(CollaboratorError::token(address, "no cached token and login is disabled").into());
        }

        self.run(address, &["login", "-method=oidc", "-field=token"], silent)
            .await?
            .ok_or_else(|| CollaboratorError::token(address, "login did not return a token").into())
    }
}
