//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigSelector;

/// pfconfig - Inspect and update the configuration cascade of an infrastructure repository.
#[derive(Parser, Debug)]
#[command(name = "pfconfig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory to search upward from for the repository root.
    #[arg(long, global = true, env = "PF_REPO_ROOT")]
    pub root: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the effective configuration of a directory.
    Resolve {
        /// Directory to resolve (defaults to the current directory).
        dir: Option<PathBuf>,
    },

    /// List environments.
    Environments,

    /// List regions.
    Regions {
        /// Only list the regions of this environment.
        #[arg(short, long)]
        environment: Option<String>,
    },

    /// Set configuration values.
    Set(SetArgs),
}

/// Arguments of the `set` command.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Environment to write to.
    #[arg(short, long, conflicts_with = "file")]
    pub environment: Option<String>,

    /// Region to write to.
    #[arg(short, long, requires = "environment")]
    pub region: Option<String>,

    /// Module to write to.
    #[arg(short, long, requires = "region")]
    pub module: Option<String>,

    /// Explicit file to write to.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Write the encrypted variant.
    #[arg(short, long)]
    pub secret: bool,

    /// Values as KEY=VALUE; map entries as MAP.KEY=VALUE.
    #[arg(required = true, value_name = "KEY=VALUE")]
    pub values: Vec<String>,
}

impl SetArgs {
    /// The cascade file addressed by the flags.
    #[must_use]
    pub fn selector(&self) -> ConfigSelector {
        if let Some(file) = &self.file {
            return ConfigSelector::File(file.clone());
        }
        match (&self.environment, &self.region, &self.module) {
            (Some(environment), Some(region), Some(module)) => {
                ConfigSelector::module(environment, region, module)
            }
            (Some(environment), Some(region), None) => ConfigSelector::region(environment, region),
            (Some(environment), None, _) => ConfigSelector::environment(environment),
            _ => ConfigSelector::Global,
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
