//! Secret store trait definition.

use async_trait::async_trait;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::config::ConfigRecord;
use crate::error::Result;

/// Decrypts and encrypts secrets files.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Decrypts the file at `path` into a structured document.
    ///
    /// Returns `None` if the file does not exist. The document is validated by
    /// the caller.
    async fn decrypt(&self, path: &Path) -> Result<Option<serde_yaml::Value>>;

    /// Encrypts `record` and writes it to `path`.
    ///
    /// Fails if the file exists and `overwrite` is false.
    async fn encrypt_write(&self, path: &Path, record: &ConfigRecord, overwrite: bool) -> Result<()>;
}
