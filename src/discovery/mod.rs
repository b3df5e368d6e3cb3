//! Environment and region discovery.
//!
//! The filesystem is the source of truth: every call globs for marker files and
//! rebuilds the metadata from scratch.

mod environments;
mod regions;
mod types;

pub use environments::{find_environment, list_environments};
pub use regions::{list_all_regions, list_environment_regions, list_regions};
pub use types::{AllRegionMeta, EnvironmentMeta, RegionMeta};

use std::path::{Path, PathBuf};

use crate::error::{PfError, Result};

/// Directories directly below `root` that contain `marker`, sorted by path.
///
/// Globbing walks the directory synchronously, so it runs on the blocking pool.
async fn marker_dirs(root: &Path, marker: &str) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{escaped}/*/{marker}");

    tokio::task::spawn_blocking(move || glob_parents(&pattern))
        .await
        .map_err(|e| PfError::internal(format!("directory scan failed: {e}")))?
}

fn glob_parents(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in glob::glob(pattern).map_err(|e| PfError::internal(format!("invalid pattern {pattern}: {e}")))? {
        let path = entry.map_err(|e| PfError::Io(e.into_error()))?;
        if let Some(dir) = path.parent() {
            dirs.push(dir.to_path_buf());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Final path component as an owned string.
fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
