//! Cascade writer.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use super::reader::ConfigReader;
use super::record::ConfigRecord;
use super::selector::ConfigSelector;
use crate::context::ExecutionContext;
use crate::error::{PfError, Result, WriteError};

/// Writes configuration values back into the cascade.
#[derive(Debug, Clone, Copy)]
pub struct ConfigWriter<'a> {
    ctx: &'a ExecutionContext,
    reader: ConfigReader<'a>,
}

impl<'a> ConfigWriter<'a> {
    /// Creates a writer bound to an execution context.
    #[must_use]
    pub const fn new(ctx: &'a ExecutionContext) -> Self {
        Self {
            ctx,
            reader: ConfigReader::new(ctx),
        }
    }

    /// Merges `values` into the file addressed by `selector` and writes it back.
    ///
    /// Returns the path that was written.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Failed`] wrapping whatever went wrong.
    pub async fn upsert(&self, selector: &ConfigSelector, values: ConfigRecord, secret: bool) -> Result<PathBuf> {
        let path = selector
            .locate(self.ctx, secret)
            .await
            .map_err(|e| wrap(selector_fallback_path(self.ctx, selector, secret), e))?
            .into_path();

        self.write(&path, values, secret)
            .await
            .map_err(|e| wrap(path.clone(), e))?;
        Ok(path)
    }

    async fn write(&self, path: &Path, values: ConfigRecord, secret: bool) -> Result<()> {
        let record = match self.reader.read(path, secret).await? {
            Some(existing) => existing.merged_with(values),
            None => values,
        };

        info!("Writing config values to {}", path.display());
        if secret {
            return self.ctx.secrets.encrypt_write(path, &record, true).await;
        }

        let content = serde_yaml::to_string(&record).map_err(|e| PfError::internal(e.to_string()))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        fs::write(path, content).await?;
        Ok(())
    }
}

fn wrap(path: PathBuf, source: PfError) -> PfError {
    WriteError::Failed {
        path,
        source: Box::new(source),
    }
    .into()
}

/// Best-effort path to name in an error raised before the target was located.
fn selector_fallback_path(ctx: &ExecutionContext, selector: &ConfigSelector, secret: bool) -> PathBuf {
    match selector {
        ConfigSelector::File(path) => path.clone(),
        _ => ctx
            .environments_dir
            .join(selector.file_name(secret).unwrap_or_default()),
    }
}
