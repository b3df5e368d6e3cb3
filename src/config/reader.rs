//! Single-file reader.
//!
//! A missing file, a file with only blank or comment lines, and an empty document
//! all read as `None`. Anything else must parse and validate or the read fails
//! with the file's path attached.

use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::record::ConfigRecord;
use super::selector::{ConfigSelector, SelectedPath};
use super::validator::ConfigValidator;
use crate::context::ExecutionContext;
use crate::error::{ConfigError, Result};

/// Reads and validates individual cascade files.
#[derive(Debug, Clone, Copy)]
pub struct ConfigReader<'a> {
    ctx: &'a ExecutionContext,
    validator: ConfigValidator,
}

impl<'a> ConfigReader<'a> {
    /// Creates a reader bound to an execution context.
    #[must_use]
    pub const fn new(ctx: &'a ExecutionContext) -> Self {
        Self {
            ctx,
            validator: ConfigValidator::new(),
        }
    }

    /// Reads one file.
    ///
    /// When `secret` is true the file is never parsed directly; the decrypt
    /// collaborator supplies its content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, does not
    /// satisfy the schema, or cannot be decrypted.
    pub async fn read(&self, path: &Path, secret: bool) -> Result<Option<ConfigRecord>> {
        let document = if secret {
            self.ctx.secrets.decrypt(path).await?
        } else {
            read_plaintext(path).await?
        };

        match document {
            Some(document) if !is_empty_document(&document) => {
                debug!("Loaded config values from {}", path.display());
                self.validate(path, document).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Reads the single file addressed by a selector.
    ///
    /// Returns `None` when the selected environment or region does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or the read fails.
    pub async fn read_selected(&self, selector: &ConfigSelector, secret: bool) -> Result<Option<ConfigRecord>> {
        match selector.locate(self.ctx, secret).await? {
            SelectedPath::Existing(path) => self.read(&path, secret).await,
            SelectedPath::New(_) => Ok(None),
        }
    }

    fn validate(&self, path: &Path, document: serde_yaml::Value) -> Result<ConfigRecord> {
        let record: ConfigRecord = serde_yaml::from_value(document)
            .map_err(|e| ConfigError::validation(path, e.to_string()))?;

        let result = self.validator.validate(&record);
        if !result.is_valid() {
            return Err(ConfigError::validation(path, result.summary()).into());
        }
        Ok(record)
    }
}

async fn read_plaintext(path: &Path) -> Result<Option<serde_yaml::Value>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            }
            .into());
        }
    };

    if is_comment_only(&content) {
        return Ok(None);
    }

    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| {
            ConfigError::InvalidYaml {
                path: path.to_path_buf(),
                source: e,
            }
            .into()
        })
}

/// True if every non-blank line is a comment.
fn is_comment_only(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

fn is_empty_document(document: &serde_yaml::Value) -> bool {
    match document {
        serde_yaml::Value::Null => true,
        serde_yaml::Value::Mapping(mapping) => mapping.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::{context, write_yaml};
    use crate::error::PfError;
    use crate::secrets::MockSecretStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let ctx = context(temp.path());

        let record = ConfigReader::new(&ctx)
            .read(&temp.path().join("global.yaml"), false)
            .await
            .expect("read");
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_comment_only_and_empty_files_are_none() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let ctx = context(temp.path());
        let reader = ConfigReader::new(&ctx);

        for (name, content) in [
            ("a.yaml", "# just a comment\n\n   # another\n"),
            ("b.yaml", "   \n"),
            ("c.yaml", "{}\n"),
            ("d.yaml", "---\n"),
        ] {
            write_yaml(temp.path(), name, content);
            let record = reader.read(&temp.path().join(name), false).await.expect("read");
            assert!(record.is_none(), "{name} should read as absent");
        }
    }

    #[tokio::test]
    async fn test_reads_valid_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_yaml(
            temp.path(),
            "environment.yaml",
            "# prod settings\nenvironment: production\naws_region: us-east-2\nextra_tags:\n  owner: ops\n",
        );
        let ctx = context(temp.path());

        let record = ConfigReader::new(&ctx)
            .read(&temp.path().join("environment.yaml"), false)
            .await
            .expect("read")
            .expect("record");
        assert_eq!(record.environment.as_deref(), Some("production"));
        assert_eq!(record.aws_region.as_ref().map(|r| r.as_str()), Some("us-east-2"));
    }

    #[tokio::test]
    async fn test_invalid_files_fail_with_path() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let ctx = context(temp.path());
        let reader = ConfigReader::new(&ctx);

        for (name, content) in [
            ("unknown.yaml", "not_a_field: 1\n"),
            ("yaml.yaml", "aws_profile: [unterminated\n"),
            ("domain.yaml", "domains:\n  Bad_Domain.com:\n    zone_id: Z1\n    record_manager_role_arn: arn\n"),
            ("bucket.yaml", "tf_state_bucket: xn--bucket\n"),
        ] {
            write_yaml(temp.path(), name, content);
            let err = reader
                .read(&temp.path().join(name), false)
                .await
                .expect_err("invalid file should fail");
            assert!(err.to_string().contains(name), "{err} should name {name}");
        }
    }

    #[tokio::test]
    async fn test_secret_read_goes_through_decrypt() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        // Ciphertext on disk would never parse as a record.
        write_yaml(temp.path(), "region.secrets.yaml", "sops: {mac: abc}\n");

        let mut secrets = MockSecretStore::new();
        secrets.expect_decrypt().times(1).returning(|_| {
            Ok(Some(
                serde_yaml::from_str("vault_token: s.secret").expect("fixture"),
            ))
        });
        let ctx = context(temp.path()).with_secret_store(Arc::new(secrets));

        let record = ConfigReader::new(&ctx)
            .read(&temp.path().join("region.secrets.yaml"), true)
            .await
            .expect("read")
            .expect("record");
        assert_eq!(record.vault_token.as_deref(), Some("s.secret"));
    }

    #[tokio::test]
    async fn test_decrypted_content_is_validated() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let mut secrets = MockSecretStore::new();
        secrets.expect_decrypt().returning(|_| {
            Ok(Some(serde_yaml::from_str("sla_target: 7").expect("fixture")))
        });
        let ctx = context(temp.path()).with_secret_store(Arc::new(secrets));

        let err = ConfigReader::new(&ctx)
            .read(&temp.path().join("global.secrets.yaml"), true)
            .await
            .expect_err("invalid decrypted values");
        assert!(matches!(err, PfError::Config(ConfigError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_read_selected_missing_environment_is_none() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_yaml(temp.path(), "environments/prod/environment.yaml", "aws_profile: prod\n");
        let ctx = context(temp.path());
        let reader = ConfigReader::new(&ctx);

        let record = reader
            .read_selected(&ConfigSelector::environment("prod"), false)
            .await
            .expect("read")
            .expect("record");
        assert_eq!(record.aws_profile.as_deref(), Some("prod"));

        let missing = reader
            .read_selected(&ConfigSelector::environment("staging"), false)
            .await
            .expect("read");
        assert!(missing.is_none());
    }
}
