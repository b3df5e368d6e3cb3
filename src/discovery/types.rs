//! Discovered environment and region metadata.

use serde::Serialize;
use std::path::PathBuf;

use crate::config::AwsRegion;

/// An environment directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentMeta {
    /// Declared name, else the directory name.
    pub name: String,
    /// Absolute directory.
    pub path: PathBuf,
    /// Declared environment subdomain.
    pub subdomain: Option<String>,
    /// Declared AWS profile.
    pub aws_profile: Option<String>,
    /// The environment's account (or organization) is deployed.
    pub deployed: bool,
}

/// A region directory within an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionMeta {
    /// Declared name, else the directory name.
    pub name: String,
    /// Absolute directory.
    pub path: PathBuf,
    /// AWS region the region deploys into.
    pub aws_region: Option<AwsRegion>,
    /// AWS profile of the region.
    pub aws_profile: Option<String>,
    /// Hosts the environment's state backend.
    pub primary: bool,
    /// The region's cluster is deployed.
    pub cluster_deployed: bool,
    /// The region's bastion is deployed.
    pub bastion_deployed: bool,
    /// Kubernetes context of the region's cluster.
    pub cluster_context_name: Option<String>,
    /// Vault address of the region.
    pub vault_address: Option<String>,
}

/// A region together with its owning environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllRegionMeta {
    /// Name of the owning environment.
    pub environment_name: String,
    /// The region, with `aws_profile` inherited from the environment when unset.
    #[serde(flatten)]
    pub region: RegionMeta,
}
