//! Configuration cascade.
//!
//! This module handles everything between configuration files on disk and the
//! effective values for a directory:
//! - The closed `ConfigRecord` schema and its validation
//! - Reading single files, plaintext or encrypted
//! - Resolving the twelve-file cascade from a directory up to the repository root
//! - Writing values back through the same hierarchy

pub mod constants;
mod merge;
mod reader;
mod record;
mod resolver;
mod selector;
mod validator;
mod writer;

pub use reader::ConfigReader;
pub use record::{AwsRegion, ConfigRecord, Domain, DomainConfig, InputValue, SlaTarget, Subdomain};
pub use resolver::{ConfigResolver, ResolvedConfig, normalize_path};
pub use selector::{ConfigSelector, SelectedPath};
pub use validator::{
    AWS_REGIONS, ConfigValidator, FieldError, ValidationResult, check_aws_region, check_bucket_name,
    check_domain, check_subdomain,
};
pub use writer::ConfigWriter;
