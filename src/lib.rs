// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![cfg_attr(not(test), deny(missing_docs))] // All public items must be documented
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # pf_config
//!
//! The configuration cascade of an infrastructure repository: discovery of
//! environments and regions, resolution of effective settings for any
//! directory, and write-back through the same hierarchy.
//!
//! ## Overview
//!
//! Every directory below the environments root inherits configuration from
//! twelve well-known files, looked up in each directory from the target up to
//! the repository root:
//!
//! ```text
//! global.yaml       global.secrets.yaml       global.user.yaml
//! environment.yaml  environment.secrets.yaml  environment.user.yaml
//! region.yaml       region.secrets.yaml       region.user.yaml
//! module.yaml       module.secrets.yaml       module.user.yaml
//! ```
//!
//! Later names win for scalar fields. `extra_tags`, `extra_inputs` and
//! `domains` are merged key by key. `*.secrets.yaml` files are encrypted at rest
//! and read through `sops`.
//!
//! ## Modules
//!
//! - [`config`]: Schema, single-file reader, cascade resolver and writer
//! - [`discovery`]: Environment and region listing
//! - [`status`]: Module deployment status predicates
//! - [`context`]: Execution context and ambient environment
//! - [`repo`]: Repository root and repository-level variables
//! - [`secrets`]: Decrypt and encrypt-and-write collaborator
//! - [`vault`]: Vault token collaborator
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```no_run
//! use pf_config::config::ConfigResolver;
//! use pf_config::context::{AmbientEnv, ExecutionContext};
//! use pf_config::repo::RepoVariables;
//!
//! # async fn example() -> pf_config::Result<()> {
//! let repo = RepoVariables::load("/work/infra/environments/prod/us-east-1")?;
//! let ctx = ExecutionContext::new(repo, AmbientEnv::from_process_env());
//!
//! let dir = ctx.environments_dir.join("prod/us-east-1/aws_eks");
//! let resolved = ConfigResolver::new(&ctx).resolve(&dir).await?;
//! assert_eq!(resolved.record.kube_name.as_deref(), Some("prod-us-east-1"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod repo;
pub mod secrets;
pub mod status;
pub mod vault;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ConfigReader, ConfigRecord, ConfigResolver, ConfigSelector, ConfigWriter, ResolvedConfig};
pub use context::{AmbientEnv, ExecutionContext};
pub use discovery::{AllRegionMeta, EnvironmentMeta, RegionMeta, find_environment, list_all_regions, list_environments, list_regions};
pub use error::{PfError, Result};
pub use repo::RepoVariables;
