//! File names, reserved names and sentinels shared across the cascade.

/// Global configuration file.
pub const GLOBAL_CONFIG: &str = "global.yaml";
/// Encrypted global configuration file.
pub const GLOBAL_SECRETS_CONFIG: &str = "global.secrets.yaml";
/// Per-user global configuration file.
pub const GLOBAL_USER_CONFIG: &str = "global.user.yaml";

/// Environment configuration file; also the environment marker.
pub const ENVIRONMENT_CONFIG: &str = "environment.yaml";
/// Encrypted environment configuration file.
pub const ENVIRONMENT_SECRETS_CONFIG: &str = "environment.secrets.yaml";
/// Per-user environment configuration file.
pub const ENVIRONMENT_USER_CONFIG: &str = "environment.user.yaml";

/// Region configuration file; also the region marker.
pub const REGION_CONFIG: &str = "region.yaml";
/// Encrypted region configuration file.
pub const REGION_SECRETS_CONFIG: &str = "region.secrets.yaml";
/// Per-user region configuration file.
pub const REGION_USER_CONFIG: &str = "region.user.yaml";

/// Module configuration file.
pub const MODULE_CONFIG: &str = "module.yaml";
/// Encrypted module configuration file.
pub const MODULE_SECRETS_CONFIG: &str = "module.secrets.yaml";
/// Per-user module configuration file.
pub const MODULE_USER_CONFIG: &str = "module.user.yaml";

/// Every cascade file name, lowest precedence first.
///
/// Later names override earlier ones, both within and across levels.
pub const CONFIG_FILE_PRECEDENCE: [&str; 12] = [
    GLOBAL_CONFIG,
    GLOBAL_SECRETS_CONFIG,
    GLOBAL_USER_CONFIG,
    ENVIRONMENT_CONFIG,
    ENVIRONMENT_SECRETS_CONFIG,
    ENVIRONMENT_USER_CONFIG,
    REGION_CONFIG,
    REGION_SECRETS_CONFIG,
    REGION_USER_CONFIG,
    MODULE_CONFIG,
    MODULE_SECRETS_CONFIG,
    MODULE_USER_CONFIG,
];

/// Marker that routes a file through the decrypt collaborator.
pub const SECRET_MARKER: &str = "secret";

/// Suffix of plaintext files written by the cascade writer.
pub const PLAIN_SUFFIX: &str = ".yaml";

/// Suffix of encrypted files written by the cascade writer.
pub const SECRETS_SUFFIX: &str = ".secrets.yaml";

/// Reserved pseudo-region holding account-wide modules.
pub const GLOBAL_REGION: &str = "global";

/// Environment that owns the AWS organization.
pub const MANAGEMENT_ENVIRONMENT: &str = "management";

/// Module that provisions the Kubernetes cluster.
pub const MODULE_AWS_EKS: &str = "aws_eks";

/// Module that provisions the bastion host.
pub const MODULE_KUBE_BASTION: &str = "kube_bastion";

/// Module that provisions a member AWS account.
pub const MODULE_AWS_ACCOUNT: &str = "aws_account";

/// Module that provisions the AWS organization.
pub const MODULE_AWS_ORGANIZATION: &str = "aws_organization";

/// Per-module deployment status file.
pub const MODULE_STATUS_FILE: &str = ".pf.yaml";

/// Placeholder for Vault values that could not be determined.
pub const INVALID_SENTINEL: &str = "@@TERRAGRUNT_INVALID@@";

/// Default module version when none is pinned.
pub const LOCAL_VERSION: &str = "local";

/// Returns true if the file name denotes an encrypted file.
#[must_use]
pub fn is_secret_file(file_name: &str) -> bool {
    file_name.contains(SECRET_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert_eq!(
            CONFIG_FILE_PRECEDENCE,
            [
                "global.yaml",
                "global.secrets.yaml",
                "global.user.yaml",
                "environment.yaml",
                "environment.secrets.yaml",
                "environment.user.yaml",
                "region.yaml",
                "region.secrets.yaml",
                "region.user.yaml",
                "module.yaml",
                "module.secrets.yaml",
                "module.user.yaml",
            ]
        );
    }

    #[test]
    fn test_secret_detection() {
        let secret: Vec<_> = CONFIG_FILE_PRECEDENCE
            .iter()
            .filter(|name| is_secret_file(name))
            .collect();
        assert_eq!(
            secret,
            [
                &GLOBAL_SECRETS_CONFIG,
                &ENVIRONMENT_SECRETS_CONFIG,
                &REGION_SECRETS_CONFIG,
                &MODULE_SECRETS_CONFIG
            ]
        );
        assert!(is_secret_file(&format!("region{SECRETS_SUFFIX}")));
        assert!(!is_secret_file(&format!("region{PLAIN_SUFFIX}")));
    }
}
