//! Validation rules for configuration records.
//!
//! String refinements (domains, subdomains, AWS regions) are enforced while
//! deserializing through the newtypes in `record`. This module holds the rules
//! themselves plus the cross-field checks run after deserialization.

use tracing::debug;
use validator::Validate;

use super::record::ConfigRecord;

/// AWS regions the stack can be deployed to.
pub const AWS_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-2",
    "ap-east-1",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ca-central-1",
    "ca-west-1",
    "eu-central-1",
    "eu-central-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-south-1",
    "eu-south-2",
    "eu-north-1",
    "il-central-1",
    "me-south-1",
    "me-central-1",
    "sa-east-1",
];

/// Longest allowed DNS label.
pub const MAX_LABEL_LEN: usize = 63;

/// Longest allowed fully-qualified domain name.
pub const MAX_DOMAIN_LEN: usize = 253;

const RESERVED_BUCKET_PREFIXES: &[&str] = &["xn--", "sthree-", "amzn-s3-demo-"];
const RESERVED_BUCKET_SUFFIXES: &[&str] = &["-s3alias", "--ol-s3", ".mrap", "--x-s3", "--table-s3"];

/// Validator for configuration records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<FieldError>,
}

/// A single validation error.
#[derive(Debug)]
pub struct FieldError {
    /// The field that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a configuration record, collecting every error.
    #[must_use]
    pub fn validate(&self, record: &ConfigRecord) -> ValidationResult {
        let mut result = ValidationResult::default();

        if let Err(errors) = record.validate() {
            for (field, field_errors) in errors.field_errors() {
                for error in field_errors {
                    result.errors.push(FieldError {
                        field: field.to_string(),
                        message: error
                            .message
                            .as_ref()
                            .map_or_else(|| error.code.to_string(), ToString::to_string),
                    });
                }
            }
        }

        if let Some(bucket) = &record.tf_state_bucket
            && let Err(message) = check_bucket_name(bucket)
        {
            result.errors.push(FieldError {
                field: String::from("tf_state_bucket"),
                message,
            });
        }

        if result.is_valid() {
            debug!("Configuration record passed validation");
        }
        result
    }
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Renders every error on one line.
    #[must_use]
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Checks a single DNS label: lowercase alphanumerics and hyphens, 1-63 chars,
/// no leading or trailing hyphen.
fn check_label(label: &str) -> Result<(), String> {
    if label.is_empty() {
        return Err(String::from("labels must not be empty"));
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(format!("label '{label}' is longer than {MAX_LABEL_LEN} characters"));
    }
    if label.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(format!("label '{label}' must be lowercase"));
    }
    if !label
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "label '{label}' may only contain lowercase letters, digits and hyphens"
        ));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(format!("label '{label}' must start and end with a letter or digit"));
    }
    Ok(())
}

/// Checks a fully-qualified domain name.
///
/// # Errors
///
/// Returns a description of the first violated rule.
pub fn check_domain(domain: &str) -> Result<(), String> {
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(format!("domain name must be {MAX_DOMAIN_LEN} characters or less"));
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(String::from("domain name must contain at least two labels"));
    }
    for label in &labels {
        check_label(label)?;
    }
    if labels.last().is_some_and(|tld| tld.len() < 2) {
        return Err(String::from("top-level label must be at least two characters"));
    }
    Ok(())
}

/// Checks a single subdomain label.
///
/// # Errors
///
/// Returns a description of the first violated rule.
pub fn check_subdomain(subdomain: &str) -> Result<(), String> {
    if subdomain.contains('.') {
        return Err(String::from("subdomain must be a single label"));
    }
    check_label(subdomain)
}

/// Checks that a region is one of the supported AWS regions.
///
/// # Errors
///
/// Returns a description if the region is unknown.
pub fn check_aws_region(region: &str) -> Result<(), String> {
    if AWS_REGIONS.contains(&region) {
        Ok(())
    } else {
        Err(format!("'{region}' is not a valid AWS region"))
    }
}

/// Checks the character rules of an S3 bucket name. Length is enforced by the
/// `Validate` derive on the record.
///
/// # Errors
///
/// Returns a description of the first violated rule.
pub fn check_bucket_name(name: &str) -> Result<(), String> {
    let bytes = name.as_bytes();
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !bytes.first().copied().is_some_and(edge_ok) || !bytes.last().copied().is_some_and(edge_ok) {
        return Err(String::from(
            "S3 bucket names must begin and end with a lowercase letter or number",
        ));
    }
    if !bytes
        .iter()
        .all(|&b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-')
    {
        return Err(String::from(
            "S3 bucket names can only contain lowercase letters, numbers, periods, and hyphens",
        ));
    }
    if name.contains("..") {
        return Err(String::from("S3 bucket names must not contain adjacent periods"));
    }
    if let Some(prefix) = RESERVED_BUCKET_PREFIXES.iter().find(|p| name.starts_with(*p)) {
        return Err(format!("S3 bucket names must not start with {prefix}"));
    }
    if let Some(suffix) = RESERVED_BUCKET_SUFFIXES.iter().find(|s| name.ends_with(*s)) {
        return Err(format!("S3 bucket names must not end with {suffix}"));
    }
    if looks_like_ipv4(name) {
        return Err(String::from("S3 bucket names must not be formatted as IP addresses"));
    }
    Ok(())
}

fn looks_like_ipv4(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|p| (1..=3).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_digit()))
}
