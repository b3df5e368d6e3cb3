//! pfconfig CLI entrypoint.
//!
//! This is the main entrypoint for the pfconfig command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pf_config::cli::{Cli, Commands, OutputFormatter, SetArgs, parse_assignments};
use pf_config::config::{ConfigResolver, ConfigWriter, normalize_path};
use pf_config::context::{AmbientEnv, ExecutionContext};
use pf_config::discovery::{find_environment, list_all_regions, list_environment_regions, list_environments};
use pf_config::error::Result;
use pf_config::repo::RepoVariables;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);
    let cwd = std::env::current_dir()?;
    let start = cli.root.clone().unwrap_or_else(|| cwd.clone());

    let repo = RepoVariables::load(&start)?;
    debug!("Repository root: {}", repo.repo_root.display());
    let ctx = ExecutionContext::new(repo, AmbientEnv::from_process_env());

    match cli.command {
        Commands::Resolve { dir } => cmd_resolve(&ctx, &cwd, dir, &formatter).await,
        Commands::Environments => cmd_environments(&ctx, &formatter).await,
        Commands::Regions { environment } => cmd_regions(&ctx, environment.as_deref(), &formatter).await,
        Commands::Set(args) => cmd_set(&ctx, &args, &formatter).await,
    }
}

/// Show the effective configuration of a directory.
async fn cmd_resolve(
    ctx: &ExecutionContext,
    cwd: &Path,
    dir: Option<PathBuf>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let dir = normalize_path(&dir.map_or_else(|| cwd.to_path_buf(), |dir| cwd.join(dir)));
    let resolved = ConfigResolver::new(ctx).resolve(&dir).await?;
    println!("{}", formatter.format_resolved(&dir, &resolved));
    Ok(())
}

/// List environments.
async fn cmd_environments(ctx: &ExecutionContext, formatter: &OutputFormatter) -> Result<()> {
    let environments = list_environments(ctx).await?;
    print!("{}", formatter.format_environments(&environments));
    Ok(())
}

/// List regions of one or every environment.
async fn cmd_regions(
    ctx: &ExecutionContext,
    environment: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let regions = match environment {
        None => list_all_regions(ctx).await?,
        Some(name) => {
            let env = find_environment(ctx, name).await?;
            list_environment_regions(ctx, &env).await?
        }
    };
    print!("{}", formatter.format_regions(&regions));
    Ok(())
}

/// Set configuration values.
async fn cmd_set(ctx: &ExecutionContext, args: &SetArgs, formatter: &OutputFormatter) -> Result<()> {
    let values = parse_assignments(&args.values)?;
    let path = ConfigWriter::new(ctx)
        .upsert(&args.selector(), values, args.secret)
        .await?;
    println!("{}", formatter.format_written(&path));
    Ok(())
}
