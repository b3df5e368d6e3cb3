//! Region listing.

use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::environments::list_environments;
use super::types::{AllRegionMeta, EnvironmentMeta, RegionMeta};
use super::{dir_name, marker_dirs};
use crate::config::constants::{GLOBAL_REGION, REGION_CONFIG};
use crate::config::{AwsRegion, ConfigResolver};
use crate::context::ExecutionContext;
use crate::error::{DiscoveryError, Result};
use crate::status::{is_bastion_deployed, is_cluster_deployed};

/// Lists the regions of the environment at `env_path`.
///
/// A region is primary when its AWS region is the environment's state-backend
/// region, except for the reserved `global` region. Cluster status is only
/// probed for regions with a Kubernetes API server, and bastion status only for
/// regions whose cluster is deployed.
///
/// # Errors
///
/// Returns [`DiscoveryError::Regions`] if any configuration in the environment is
/// invalid or a deployment probe fails.
pub async fn list_regions(ctx: &ExecutionContext, env_path: &Path) -> Result<Vec<RegionMeta>> {
    let wrap = |e| DiscoveryError::Regions {
        path: env_path.to_path_buf(),
        source: Box::new(e),
    };

    let resolver = ConfigResolver::new(ctx);
    let state_region = resolver.resolve(env_path).await.map_err(wrap)?.record.tf_state_region;

    let dirs = marker_dirs(env_path, REGION_CONFIG).await.map_err(wrap)?;
    debug!("Found {} regions in {}", dirs.len(), env_path.display());

    let regions = try_join_all(
        dirs.into_iter()
            .map(|dir| describe(ctx, resolver, state_region.as_ref(), dir)),
    )
    .await
    .map_err(wrap)?;
    Ok(regions)
}

async fn describe(
    ctx: &ExecutionContext,
    resolver: ConfigResolver<'_>,
    state_region: Option<&AwsRegion>,
    path: PathBuf,
) -> Result<RegionMeta> {
    let record = resolver.resolve(&path).await?.record;
    let name = record.region.clone().unwrap_or_else(|| dir_name(&path));

    let cluster_deployed = match (&record.environment, &record.region, &record.kube_api_server) {
        (Some(environment), Some(region), Some(_)) => {
            is_cluster_deployed(ctx.status.as_ref(), environment, region).await?
        }
        _ => false,
    };
    let bastion_deployed = match (&record.environment, &record.region) {
        (Some(environment), Some(region)) if cluster_deployed => {
            is_bastion_deployed(ctx.status.as_ref(), environment, region).await?
        }
        _ => false,
    };

    let primary = state_region.is_some() && state_region == record.aws_region.as_ref() && name != GLOBAL_REGION;

    Ok(RegionMeta {
        name,
        path,
        aws_region: record.aws_region,
        aws_profile: record.aws_profile,
        primary,
        cluster_deployed,
        bastion_deployed,
        cluster_context_name: record.kube_config_context,
        vault_address: record.vault_addr,
    })
}

/// Lists the regions of one discovered environment, annotated with it.
///
/// Regions without their own AWS profile inherit the environment's.
///
/// # Errors
///
/// Returns an error if listing the regions fails.
pub async fn list_environment_regions(
    ctx: &ExecutionContext,
    environment: &EnvironmentMeta,
) -> Result<Vec<AllRegionMeta>> {
    let regions = list_regions(ctx, &environment.path).await?;
    Ok(regions
        .into_iter()
        .map(|mut region| {
            if region.aws_profile.is_none() {
                region.aws_profile.clone_from(&environment.aws_profile);
            }
            AllRegionMeta {
                environment_name: environment.name.clone(),
                region,
            }
        })
        .collect())
}

/// Lists the regions of every environment.
///
/// # Errors
///
/// Returns an error if listing environments or any of their regions fails.
pub async fn list_all_regions(ctx: &ExecutionContext) -> Result<Vec<AllRegionMeta>> {
    let environments = list_environments(ctx).await?;
    let per_environment = try_join_all(
        environments
            .iter()
            .map(|environment| list_environment_regions(ctx, environment)),
    )
    .await?;
    Ok(per_environment.into_iter().flatten().collect())
}
