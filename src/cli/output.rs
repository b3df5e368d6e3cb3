//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::path::Path;
use tabled::{Table, Tabled};

use crate::config::ResolvedConfig;
use crate::discovery::{AllRegionMeta, EnvironmentMeta};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Environment row for table display.
#[derive(Tabled)]
struct EnvironmentRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Subdomain")]
    subdomain: String,
    #[tabled(rename = "AWS Profile")]
    aws_profile: String,
    #[tabled(rename = "Deployed")]
    deployed: String,
    #[tabled(rename = "Path")]
    path: String,
}

/// Region row for table display.
#[derive(Tabled)]
struct RegionRow {
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Region")]
    name: String,
    #[tabled(rename = "AWS Region")]
    aws_region: String,
    #[tabled(rename = "Primary")]
    primary: String,
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Bastion")]
    bastion: String,
    #[tabled(rename = "Context")]
    context: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a resolved configuration.
    #[must_use]
    pub fn format_resolved(&self, directory: &Path, resolved: &ResolvedConfig) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(resolved).unwrap_or_default(),
            OutputFormat::Text => {
                let body = serde_yaml::to_string(resolved).unwrap_or_default();
                format!("# {}\n{body}", directory.display().to_string().bold())
            }
        }
    }

    /// Formats discovered environments.
    #[must_use]
    pub fn format_environments(&self, environments: &[EnvironmentMeta]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(environments).unwrap_or_default(),
            OutputFormat::Text => {
                if environments.is_empty() {
                    return format!("{} No environments found.\n", "!".yellow());
                }
                let rows: Vec<EnvironmentRow> = environments
                    .iter()
                    .map(|env| EnvironmentRow {
                        name: env.name.clone(),
                        subdomain: Self::or_dash(env.subdomain.as_deref()),
                        aws_profile: Self::or_dash(env.aws_profile.as_deref()),
                        deployed: Self::flag(env.deployed),
                        path: env.path.display().to_string(),
                    })
                    .collect();
                format!("{}\n", Table::new(rows))
            }
        }
    }

    /// Formats discovered regions.
    #[must_use]
    pub fn format_regions(&self, regions: &[AllRegionMeta]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(regions).unwrap_or_default(),
            OutputFormat::Text => {
                if regions.is_empty() {
                    return format!("{} No regions found.\n", "!".yellow());
                }
                let rows: Vec<RegionRow> = regions
                    .iter()
                    .map(|meta| RegionRow {
                        environment: meta.environment_name.clone(),
                        name: meta.region.name.clone(),
                        aws_region: Self::or_dash(meta.region.aws_region.as_ref().map(|r| r.as_str())),
                        primary: if meta.region.primary {
                            "primary".cyan().to_string()
                        } else {
                            String::new()
                        },
                        cluster: Self::flag(meta.region.cluster_deployed),
                        bastion: Self::flag(meta.region.bastion_deployed),
                        context: Self::or_dash(meta.region.cluster_context_name.as_deref()),
                    })
                    .collect();
                format!("{}\n", Table::new(rows))
            }
        }
    }

    /// Formats the result of a write.
    #[must_use]
    pub fn format_written(&self, path: &Path) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({ "status": "success", "path": path });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} Updated {}", "✓".green(), path.display()),
        }
    }

    fn flag(value: bool) -> String {
        if value {
            "yes".green().to_string()
        } else {
            "no".dimmed().to_string()
        }
    }

    fn or_dash(value: Option<&str>) -> String {
        value.unwrap_or("-").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigRecord;
    use crate::discovery::RegionMeta;
    use std::path::PathBuf;

    fn region(name: &str, primary: bool) -> AllRegionMeta {
        AllRegionMeta {
            environment_name: String::from("prod"),
            region: RegionMeta {
                name: name.to_string(),
                path: PathBuf::from("/repo/environments/prod").join(name),
                aws_region: Some("us-east-1".try_into().expect("valid")),
                aws_profile: Some(String::from("prod")),
                primary,
                cluster_deployed: false,
                bastion_deployed: false,
                cluster_context_name: Some(format!("prod-{name}")),
                vault_address: None,
            },
        }
    }

    #[test]
    fn test_regions_json_is_flat() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_regions(&[region("us-east-1", true)]);
        let json: serde_json::Value = serde_json::from_str(&output).expect("json");

        assert_eq!(json[0]["environment_name"], "prod");
        assert_eq!(json[0]["name"], "us-east-1");
        assert_eq!(json[0]["primary"], true);
    }

    #[test]
    fn test_regions_text_table() {
        colored::control::set_override(false);
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let output = formatter.format_regions(&[region("us-east-1", true), region("global", false)]);

        assert!(output.contains("AWS Region"));
        assert!(output.contains("prod-global"));
        assert!(output.contains("primary"));
    }

    #[test]
    fn test_empty_environments() {
        colored::control::set_override(false);
        let formatter = OutputFormatter::new(OutputFormat::Text);
        assert!(formatter.format_environments(&[]).contains("No environments found"));
    }

    #[test]
    fn test_resolved_text_is_yaml() {
        colored::control::set_override(false);
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let resolved = ResolvedConfig {
            record: ConfigRecord {
                aws_profile: Some(String::from("prod")),
                ..ConfigRecord::default()
            },
            environment_dir: Some(String::from("prod")),
            region_dir: None,
            module_dir: None,
        };

        let output = formatter.format_resolved(Path::new("/repo/environments/prod"), &resolved);
        assert!(output.starts_with("# /repo/environments/prod\n"));
        assert!(output.contains("aws_profile: prod\n"));
        assert!(output.contains("environment_dir: prod\n"));
    }
}
