//! Error types for the configuration cascade.
//!
//! Absence of a file, environment or region is never an error; it is represented
//! as `None` or an empty collection. Everything here is a hard failure that carries
//! the offending path or hierarchy selector so the user can find what to fix.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the configuration system.
#[derive(Debug, Error)]
pub enum PfError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Environment or region discovery errors.
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Write-back errors.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// Failures of external tools (sops, vault, module status).
    #[error("External tool error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A relative path was passed where an absolute one is required.
    #[error("Configuration must be resolved from an absolute path, given '{}'", path.display())]
    RelativePath {
        /// The offending path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("Unable to read file at {}: {source}", path.display())]
    ReadFailed {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML.
    #[error("Invalid YAML syntax in file at {}: {source}", path.display())]
    InvalidYaml {
        /// Path of the file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The file parsed but did not satisfy the schema.
    #[error("Invalid values in file at {}: {message}", path.display())]
    Validation {
        /// Path of the file.
        path: PathBuf,
        /// Description of the violation.
        message: String,
    },

    /// No repository root was found above the start directory.
    #[error("No repository root (.git) found above {}", start.display())]
    RepoRootNotFound {
        /// Directory the search started from.
        start: PathBuf,
    },

    /// The repository configuration file is missing.
    #[error("Repo configuration file does not exist at {}", path.display())]
    RepoConfigMissing {
        /// Expected path of the file.
        path: PathBuf,
    },
}

/// Errors raised while discovering environments and regions.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Listing environments failed.
    #[error("Unable to get environments: {source}")]
    Environments {
        /// The originating error.
        source: Box<PfError>,
    },

    /// Listing the regions of an environment failed.
    #[error("Unable to get regions in {}: {source}", path.display())]
    Regions {
        /// Environment directory being listed.
        path: PathBuf,
        /// The originating error.
        source: Box<PfError>,
    },

    /// No discovered environment has the requested name.
    #[error("Environment '{name}' not found in {}", environments_dir.display())]
    EnvironmentNotFound {
        /// Requested environment name.
        name: String,
        /// Environments directory that was searched.
        environments_dir: PathBuf,
    },
}

/// Errors raised while writing configuration values back to disk.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Reading, merging or writing the target file failed.
    #[error("Failed to write new config values to {}: {source}", path.display())]
    Failed {
        /// The file that was being written.
        path: PathBuf,
        /// The originating error.
        source: Box<PfError>,
    },
}

/// Failures of external collaborators.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Decrypting a secrets file failed.
    #[error("Failed to decrypt sops file at {}: {message}", path.display())]
    Decrypt {
        /// Path of the encrypted file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// Encrypting and writing a secrets file failed.
    #[error("Failed to encrypt sops file at {}: {message}", path.display())]
    Encrypt {
        /// Path of the encrypted file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// Querying a module's deployment status failed.
    #[error("Unable to get status of module {environment}/{region}/{module}: {source}")]
    Probe {
        /// Environment name.
        environment: String,
        /// Region name.
        region: String,
        /// Module identifier.
        module: String,
        /// The originating error.
        source: Box<PfError>,
    },

    /// Fetching a Vault token failed.
    #[error("Unable to get Vault token for {address}: {message}")]
    Token {
        /// Vault address used.
        address: String,
        /// Description of the failure.
        message: String,
    },
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, PfError>;

impl PfError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ConfigError {
    /// Creates a validation error for the given file.
    #[must_use]
    pub fn validation(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl CollaboratorError {
    /// Wraps a probe failure with the module it was querying.
    #[must_use]
    pub fn probe(environment: &str, region: &str, module: &str, source: PfError) -> Self {
        Self::Probe {
            environment: environment.to_string(),
            region: region.to_string(),
            module: module.to_string(),
            source: Box::new(source),
        }
    }

    /// Creates a token error.
    #[must_use]
    pub fn token(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Token {
            address: address.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors_keep_path_and_cause() {
        let inner = PfError::from(ConfigError::validation("/repo/global.yaml", "unknown field `foo`"));
        let err = PfError::from(WriteError::Failed {
            path: PathBuf::from("/repo/environments/prod/environment.yaml"),
            source: Box::new(inner),
        });

        let message = err.to_string();
        assert!(message.contains("Failed to write new config values"));
        assert!(message.contains("/repo/environments/prod/environment.yaml"));
        assert!(message.contains("/repo/global.yaml"));
        assert!(message.contains("unknown field `foo`"));
    }

    #[test]
    fn test_probe_error_names_module() {
        let err = CollaboratorError::probe("prod", "us-east-1", "aws_eks", PfError::internal("boom"));
        assert_eq!(
            err.to_string(),
            "Unable to get status of module prod/us-east-1/aws_eks: Internal error: boom"
        );
    }
}
