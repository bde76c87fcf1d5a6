//! CLI command definitions and execution
//!
//! Each command opens a session, drives a `BucketManager`, and maps failures
//! to an exit code.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use wt_core::{ConfigManager, Defaults, ProfileManager};
use wt_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

mod completions;
mod list_buckets;
mod list_objects;
mod profile;
mod setup;
mod sync;

/// webotron - publish static websites to S3
///
/// Creates website buckets, makes them publicly readable, and mirrors
/// local directories into them.
#[derive(Parser, Debug)]
#[command(name = "webotron")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress indicator
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags selecting the storage session
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Profile to use: a webotron profile, or a named AWS profile
    #[arg(long, global = true, env = "WEBOTRON_PROFILE")]
    pub profile: Option<String>,

    /// Region override for the session
    #[arg(long, global = true)]
    pub region: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all buckets
    ListBuckets(list_buckets::ListBucketsArgs),

    /// List the objects in a bucket
    ListBucketObjects(list_objects::ListObjectsArgs),

    /// Create a bucket and configure it for public website hosting
    SetupBucket(setup::SetupArgs),

    /// Upload the contents of a local directory to a bucket
    Sync(sync::SyncArgs),

    /// Manage webotron profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let defaults = match ConfigManager::new().and_then(|m| m.load()) {
        Ok(config) => config.defaults,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable configuration");
            Defaults::default()
        }
    };
    let output_config = output_config(&cli, &defaults);

    match cli.command {
        Commands::ListBuckets(args) => {
            list_buckets::execute(args, &cli.session, output_config).await
        }
        Commands::ListBucketObjects(args) => {
            list_objects::execute(args, &cli.session, output_config).await
        }
        Commands::SetupBucket(args) => setup::execute(args, &cli.session, output_config).await,
        Commands::Sync(args) => {
            sync::execute(args, &cli.session, output_config, defaults.symlinks).await
        }
        Commands::Profile(cmd) => profile::execute(cmd, output_config),
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Merge command-line flags with configured defaults; flags win
fn output_config(cli: &Cli, defaults: &Defaults) -> OutputConfig {
    OutputConfig {
        json: cli.json || defaults.output == "json",
        no_color: cli.no_color || defaults.color == "never",
        no_progress: cli.no_progress || !defaults.progress,
        quiet: cli.quiet,
    }
}

/// Open the storage session selected by `--profile` and `--region`
///
/// A `--profile` naming a webotron profile uses its endpoint and
/// credentials; any other name is looked up in the shared AWS config.
pub(crate) async fn open_session(session: &SessionArgs) -> anyhow::Result<S3Client> {
    let Some(name) = session.profile.as_deref() else {
        return Ok(S3Client::from_env(None, session.region.as_deref()).await?);
    };

    let profiles = ProfileManager::new().context("Failed to load profiles")?;
    match profiles.find(name)? {
        Some(mut profile) => {
            if let Some(region) = &session.region {
                profile.region = region.clone();
            }
            Ok(S3Client::new(&profile).await?)
        }
        None => Ok(S3Client::from_env(Some(name), session.region.as_deref()).await?),
    }
}

/// Exit code for a failed command
pub(crate) fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    err.downcast_ref::<wt_core::Error>()
        .map(ExitCode::from)
        .unwrap_or(ExitCode::GeneralError)
}

/// Check a bucket name against the S3 naming rules
pub(crate) fn validate_bucket_name(name: &str) -> Result<(), String> {
    if name.len() < 3 || name.len() > 63 {
        return Err("Bucket name must be between 3 and 63 characters".to_string());
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(format!(
            "Invalid bucket name '{name}': use lowercase letters, digits, '-' and '.'"
        ));
    }

    let first = name.chars().next();
    let last = name.chars().last();
    if !first.is_some_and(|c| c.is_ascii_alphanumeric())
        || !last.is_some_and(|c| c.is_ascii_alphanumeric())
    {
        return Err(format!(
            "Invalid bucket name '{name}': must start and end with a letter or digit"
        ));
    }

    Ok(())
}
