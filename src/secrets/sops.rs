//! `sops`-backed secret store.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::ConfigRecord;
use crate::error::{CollaboratorError, PfError, Result};

use super::store::SecretStore;

/// Default binary name.
const SOPS_BINARY: &str = "sops";

/// Secret store that shells out to the `sops` binary.
#[derive(Debug, Clone)]
pub struct SopsCli {
    /// Binary to invoke.
    binary: String,
}

impl Default for SopsCli {
    fn default() -> Self {
        Self::new()
    }
}

impl SopsCli {
    /// Creates a store that runs `sops` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            binary: String::from(SOPS_BINARY),
        }
    }

    /// Uses a specific binary instead of `sops` from `PATH`.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

fn decrypt_error(path: &Path, message: impl Into<String>) -> PfError {
    PfError::Collaborator(CollaboratorError::Decrypt {
        path: path.to_path_buf(),
        message: message.into(),
    })
}

fn encrypt_error(path: &Path, message: impl Into<String>) -> PfError {
    PfError::Collaborator(CollaboratorError::Encrypt {
        path: path.to_path_buf(),
        message: message.into(),
    })
}

#[async_trait]
impl SecretStore for SopsCli {
    async fn decrypt(&self, path: &Path) -> Result<Option<serde_yaml::Value>> {
        if !fs::try_exists(path).await? {
            return Ok(None);
        }

        debug!("Decrypting {}", path.display());
        let mut command = Command::new(&self.binary);
        command.args(["-d", "--output-type", "json"]).arg(path);
        if let Some(dir) = path.parent() {
            command.current_dir(dir);
        }
        let output = command
            .output()
            .await
            .map_err(|e| decrypt_error(path, format!("failed to run {}: {e}", self.binary)))?;

        if !output.status.success() {
            return Err(decrypt_error(
                path,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| decrypt_error(path, format!("invalid JSON output from sops: {e}")))?;
        let document = serde_yaml::to_value(json)
            .map_err(|e| decrypt_error(path, format!("unrepresentable document: {e}")))?;

        Ok(Some(document))
    }

    async fn encrypt_write(&self, path: &Path, record: &ConfigRecord, overwrite: bool) -> Result<()> {
        if !overwrite && fs::try_exists(path).await? {
            return Err(encrypt_error(path, "file already exists"));
        }

        let plaintext = serde_yaml::to_string(record)
            .map_err(|e| encrypt_error(path, format!("failed to serialize values: {e}")))?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).await?;

        info!("Encrypting values into {}", path.display());
        let mut child = Command::new(&self.binary)
            .args(["--encrypt", "--input-type", "yaml", "--output-type", "yaml", "--filename-override"])
            .arg(path)
            .arg("/dev/stdin")
            .current_dir(dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| encrypt_error(path, format!("failed to run {}: {e}", self.binary)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(plaintext.as_bytes()).await?;
        }
        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(encrypt_error(
                path,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        fs::write(path, &output.stdout).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_decrypt_missing_file_is_none() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let store = SopsCli::new().with_binary("sops-binary-that-does-not-exist");

        let result = store
            .decrypt(&temp.path().join("region.secrets.yaml"))
            .await
            .expect("missing file should not fail");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_encrypt_refuses_to_overwrite() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("global.secrets.yaml");
        std::fs::write(&path, "existing").expect("write fixture");

        let store = SopsCli::new().with_binary("sops-binary-that-does-not-exist");
        let err = store
            .encrypt_write(&path, &ConfigRecord::default(), false)
            .await
            .expect_err("existing file should not be overwritten");
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_decrypt_reports_missing_binary() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let path = temp.path().join("module.secrets.yaml");
        std::fs::write(&path, "sops: {}").expect("write fixture");

        let store = SopsCli::new().with_binary("sops-binary-that-does-not-exist");
        let err = store.decrypt(&path).await.expect_err("binary is missing");
        assert!(matches!(
            err,
            PfError::Collaborator(CollaboratorError::Decrypt { .. })
        ));
    }
}
