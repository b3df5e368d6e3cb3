//! Configuration record types.
//!
//! [`ConfigRecord`] maps one-to-one onto the keys allowed in any cascade file.
//! The record is closed: unknown keys are rejected so typos in hand-edited files
//! surface as errors instead of being ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::Validate;

use super::validator::{check_aws_region, check_domain, check_subdomain};

/// Arbitrary value passed through to module inputs.
pub type InputValue = serde_yaml::Value;

/// A validated configuration file, or a partial one used for write-back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ConfigRecord {
    // Domains
    /// DNS zones keyed by domain name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<BTreeMap<Domain, DomainConfig>>,

    // Metadata
    /// Availability target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_target: Option<SlaTarget>,
    /// Tags applied to every resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_tags: Option<BTreeMap<String, String>>,

    // Environment
    /// Environment name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Subdomain prefix for the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_subdomain: Option<Subdomain>,

    // Region
    /// Region name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    // Inputs
    /// Extra inputs passed to every module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_inputs: Option<BTreeMap<String, InputValue>>,

    // Module source
    /// Module version pin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Stack version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pf_stack_version: Option<String>,
    /// Local checkout of the stack for development.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pf_stack_local_path: Option<String>,
    /// Whether the local stack path is relative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pf_stack_local_use_relative: Option<bool>,
    /// Module name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    // State backend
    /// Account holding the state bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tf_state_account_id: Option<String>,
    /// Profile used for the state backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tf_state_profile: Option<String>,
    /// Region holding the state bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tf_state_region: Option<AwsRegion>,
    /// State bucket name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 63, message = "S3 bucket names must be 3 to 63 characters long"))]
    pub tf_state_bucket: Option<String>,
    /// State lock table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tf_state_lock_table: Option<String>,

    // AWS provider
    /// Primary account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_account_id: Option<String>,
    /// Primary profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_profile: Option<String>,
    /// Primary region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<AwsRegion>,
    /// Secondary account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_secondary_account_id: Option<String>,
    /// Secondary profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_secondary_profile: Option<String>,
    /// Secondary region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_secondary_region: Option<AwsRegion>,

    // Kubernetes provider
    /// API server endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_api_server: Option<String>,
    /// Cluster name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_name: Option<String>,
    /// Ingress domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_domain: Option<String>,
    /// kubectl context name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_config_context: Option<String>,

    // Vault provider
    /// Vault address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_addr: Option<String>,
    /// Vault token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_token: Option<String>,

    // Identity provider
    /// Authentik URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentik_url: Option<String>,
    /// Authentik API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentik_token: Option<String>,
}

/// Route53 settings for one managed domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainConfig {
    /// Hosted zone id.
    pub zone_id: String,
    /// Role allowed to manage records in the zone.
    pub record_manager_role_arn: String,
}

/// Availability target: 1 = 99%, 2 = 99.9%, 3 = 99.99%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SlaTarget {
    /// Single availability zone.
    One = 1,
    /// Multi-AZ with reduced redundancy.
    Two = 2,
    /// Fully redundant.
    Three = 3,
}

impl TryFrom<u8> for SlaTarget {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(format!("sla_target must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<SlaTarget> for u8 {
    fn from(value: SlaTarget) -> Self {
        value as Self
    }
}

/// Declares a string newtype checked on construction and on deserialization.
macro_rules! validated_string {
    ($(#[$meta:meta])* $name:ident, $check:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Returns the value as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                $check(&value).map_err(|e| format!("invalid {} '{value}': {e}", stringify!($name)))?;
                Ok(Self(value))
            }
        }

        impl TryFrom<&str> for $name {
            type Error = String;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::try_from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

validated_string!(
    /// Fully-qualified, lowercase domain name.
    Domain,
    check_domain
);

validated_string!(
    /// Single lowercase DNS label.
    Subdomain,
    check_subdomain
);

validated_string!(
    /// One of the supported AWS regions.
    AwsRegion,
    check_aws_region
);
