//! Environment listing.

use futures::future::try_join_all;
use std::path::PathBuf;
use tracing::debug;

use super::types::EnvironmentMeta;
use super::{dir_name, marker_dirs};
use crate::config::ConfigReader;
use crate::config::constants::ENVIRONMENT_CONFIG;
use crate::context::ExecutionContext;
use crate::error::{DiscoveryError, Result};
use crate::status::is_environment_deployed;

/// Lists every directory directly below the environments directory that holds
/// an environment marker file.
///
/// # Errors
///
/// Returns [`DiscoveryError::Environments`] if any marker file is invalid or a
/// deployment probe fails.
pub async fn list_environments(ctx: &ExecutionContext) -> Result<Vec<EnvironmentMeta>> {
    let wrap = |e| DiscoveryError::Environments { source: Box::new(e) };

    let dirs = marker_dirs(&ctx.environments_dir, ENVIRONMENT_CONFIG).await.map_err(wrap)?;
    debug!("Found {} environments in {}", dirs.len(), ctx.environments_dir.display());

    let environments = try_join_all(dirs.into_iter().map(|dir| describe(ctx, dir)))
        .await
        .map_err(wrap)?;
    Ok(environments)
}

/// Finds the discovered environment called `name`.
///
/// # Errors
///
/// Returns [`DiscoveryError::EnvironmentNotFound`] if no environment has that
/// name, or any error from [`list_environments`].
pub async fn find_environment(ctx: &ExecutionContext, name: &str) -> Result<EnvironmentMeta> {
    list_environments(ctx)
        .await?
        .into_iter()
        .find(|env| env.name == name)
        .ok_or_else(|| {
            DiscoveryError::EnvironmentNotFound {
                name: name.to_string(),
                environments_dir: ctx.environments_dir.clone(),
            }
            .into()
        })
}

async fn describe(ctx: &ExecutionContext, path: PathBuf) -> Result<EnvironmentMeta> {
    let record = ConfigReader::new(ctx)
        .read(&path.join(ENVIRONMENT_CONFIG), false)
        .await?
        .unwrap_or_default();

    let name = record.environment.unwrap_or_else(|| dir_name(&path));
    let deployed = is_environment_deployed(ctx.status.as_ref(), &name).await?;

    Ok(EnvironmentMeta {
        subdomain: record.environment_subdomain.map(String::from),
        aws_profile: record.aws_profile,
        name,
        path,
        deployed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::{GLOBAL_REGION, MODULE_AWS_ORGANIZATION};
    use crate::context::test_support::{context, write_yaml};
    use crate::error::PfError;
    use crate::status::{DeployStatus, MockModuleStatusProbe, ModuleStatus};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lists_environments_with_declared_names() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_yaml(
            temp.path(),
            "environments/production/environment.yaml",
            "environment: prod\nenvironment_subdomain: prod\naws_profile: prod-admin\n",
        );
        write_yaml(temp.path(), "environments/development/environment.yaml", "# empty\n");
        write_yaml(temp.path(), "environments/not-an-env/region.yaml", "");
        let ctx = context(temp.path());

        let environments = list_environments(&ctx).await.expect("list");
        assert_eq!(environments.len(), 2);

        assert_eq!(environments[0].name, "development");
        assert_eq!(environments[0].aws_profile, None);
        assert!(!environments[0].deployed);

        assert_eq!(environments[1].name, "prod");
        assert_eq!(environments[1].path, temp.path().join("environments/production"));
        assert_eq!(environments[1].subdomain.as_deref(), Some("prod"));
        assert_eq!(environments[1].aws_profile.as_deref(), Some("prod-admin"));
    }

    #[tokio::test]
    async fn test_management_environment_checks_organization() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_yaml(temp.path(), "environments/management/environment.yaml", "");
        let mut status = MockModuleStatusProbe::new();
        status.expect_status().times(1).returning(|environment, region, module| {
            assert_eq!((environment, region, module), ("management", GLOBAL_REGION, MODULE_AWS_ORGANIZATION));
            Ok(ModuleStatus {
                deploy_status: DeployStatus::Success,
                ..ModuleStatus::default()
            })
        });
        let ctx = context(temp.path()).with_status_probe(Arc::new(status));

        let environments = list_environments(&ctx).await.expect("list");
        assert!(environments[0].deployed);
    }

    #[tokio::test]
    async fn test_invalid_marker_aborts_listing() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_yaml(temp.path(), "environments/prod/environment.yaml", "environment_subdomain: Not_Valid\n");
        let ctx = context(temp.path());

        let err = list_environments(&ctx).await.expect_err("invalid marker");
        assert!(matches!(err, PfError::Discovery(DiscoveryError::Environments { .. })));
        assert!(err.to_string().contains("Unable to get environments"));
    }

    #[tokio::test]
    async fn test_find_environment_by_declared_name() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        write_yaml(temp.path(), "environments/production/environment.yaml", "environment: prod\n");
        let ctx = context(temp.path());

        let env = find_environment(&ctx, "prod").await.expect("find");
        assert_eq!(env.path, temp.path().join("environments/production"));

        let err = find_environment(&ctx, "staging").await.expect_err("unknown name");
        assert!(matches!(
            err,
            PfError::Discovery(DiscoveryError::EnvironmentNotFound { ref name, .. }) if name == "staging"
        ));
        assert!(err.to_string().contains("Environment 'staging' not found"));
    }

    #[tokio::test]
    async fn test_missing_environments_dir_is_empty() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let ctx = context(temp.path());
        assert!(list_environments(&ctx).await.expect("list").is_empty());
    }
}
