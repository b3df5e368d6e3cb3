//! Deployment status predicates.
//!
//! Each predicate asks a [`ModuleStatusProbe`] about one well-known module and
//! treats `deploy_status == success` as deployed.

mod probe;

pub use probe::{DeployStatus, FileStatusProbe, InitStatus, ModuleStatus, ModuleStatusProbe};

#[cfg(test)]
pub use probe::MockModuleStatusProbe;

use tracing::debug;

use crate::config::constants::{
    GLOBAL_REGION, MANAGEMENT_ENVIRONMENT, MODULE_AWS_ACCOUNT, MODULE_AWS_EKS,
    MODULE_AWS_ORGANIZATION, MODULE_KUBE_BASTION,
};
use crate::error::{CollaboratorError, Result};

async fn is_module_deployed(
    probe: &dyn ModuleStatusProbe,
    environment: &str,
    region: &str,
    module: &str,
) -> Result<bool> {
    let status = probe
        .status(environment, region, module)
        .await
        .map_err(|e| CollaboratorError::probe(environment, region, module, e))?;
    debug!(
        "Module {environment}/{region}/{module} deploy status: {:?}",
        status.deploy_status
    );
    Ok(status.is_deployed())
}

/// Returns true if the Kubernetes cluster of the region is deployed.
///
/// # Errors
///
/// Returns an error if the probe fails.
pub async fn is_cluster_deployed(
    probe: &dyn ModuleStatusProbe,
    environment: &str,
    region: &str,
) -> Result<bool> {
    is_module_deployed(probe, environment, region, MODULE_AWS_EKS).await
}

/// Returns true if the bastion of the region is deployed.
///
/// # Errors
///
/// Returns an error if the probe fails.
pub async fn is_bastion_deployed(
    probe: &dyn ModuleStatusProbe,
    environment: &str,
    region: &str,
) -> Result<bool> {
    is_module_deployed(probe, environment, region, MODULE_KUBE_BASTION).await
}

/// Returns true if the environment's AWS account exists.
///
/// The management environment owns the organization instead of a member account.
///
/// # Errors
///
/// Returns an error if the probe fails.
pub async fn is_environment_deployed(probe: &dyn ModuleStatusProbe, environment: &str) -> Result<bool> {
    let module = if environment == MANAGEMENT_ENVIRONMENT {
        MODULE_AWS_ORGANIZATION
    } else {
        MODULE_AWS_ACCOUNT
    };
    is_module_deployed(probe, environment, GLOBAL_REGION, module).await
}
