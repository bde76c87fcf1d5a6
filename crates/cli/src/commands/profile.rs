//! Profile management commands
//!
//! Profiles are named storage sessions: a region, plus an optional custom
//! endpoint and static credentials.

use clap::Subcommand;
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use wt_core::{Profile, ProfileManager, DEFAULT_REGION};

/// Profile subcommands for managing storage sessions
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List all configured profiles
    List(ListArgs),

    /// Remove a profile
    Remove(RemoveArgs),
}

/// Arguments for the `profile set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "default", "staging")
    pub name: String,

    /// Region new buckets are created in
    #[arg(long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Custom S3-compatible endpoint URL (e.g., "http://localhost:9000")
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Access key ID
    #[arg(long, requires = "secret_key")]
    pub access_key: Option<String>,

    /// Secret access key
    #[arg(long, requires = "access_key")]
    pub secret_key: Option<String>,

    /// Address buckets by path instead of virtual host
    #[arg(long)]
    pub path_style: bool,
}

/// Arguments for the `profile list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show full details including endpoints
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `profile remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

/// JSON output for profile list
#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<ProfileInfo>,
}

/// Profile information for output (without secrets)
#[derive(Serialize)]
struct ProfileInfo {
    name: String,
    region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    credentials: &'static str,
    path_style: bool,
}

impl From<&Profile> for ProfileInfo {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            region: profile.region.clone(),
            endpoint: profile.endpoint.clone(),
            credentials: if profile.static_credentials().is_some() {
                "static"
            } else {
                "environment"
            },
            path_style: profile.path_style,
        }
    }
}

/// JSON output for profile set/remove operations
#[derive(Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Execute a profile subcommand
pub fn execute(cmd: ProfileCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match ProfileManager::new() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    match cmd {
        ProfileCommands::Set(args) => execute_set(args, &manager, &formatter),
        ProfileCommands::List(args) => execute_list(args, &manager, &formatter),
        ProfileCommands::Remove(args) => execute_remove(args, &manager, &formatter),
    }
}

fn build_profile(args: SetArgs) -> Result<Profile, String> {
    if args.name.trim().is_empty() {
        return Err("Profile name cannot be empty".to_string());
    }
    if args.region.trim().is_empty() {
        return Err("Region cannot be empty".to_string());
    }

    let mut profile = Profile::new(args.name, args.region);
    if let Some(endpoint) = &args.endpoint {
        profile = profile
            .with_endpoint(endpoint)
            .map_err(|e| format!("Invalid endpoint '{endpoint}': {e}"))?;
    }
    if let (Some(access), Some(secret)) = (args.access_key, args.secret_key) {
        profile = profile.with_credentials(access, secret);
    }
    profile.path_style = args.path_style;
    Ok(profile)
}

fn execute_set(args: SetArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let profile = match build_profile(args) {
        Ok(p) => p,
        Err(msg) => {
            formatter.error(&msg);
            return ExitCode::UsageError;
        }
    };
    let name = profile.name.clone();

    match manager.set(profile) {
        Ok(()) => {
            tracing::debug!(profile = %name, "Saved profile");
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: name.clone(),
                    message: format!("Profile '{name}' configured successfully"),
                });
            } else {
                formatter.success(&format!("Profile '{name}' configured successfully."));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}

fn execute_list(args: ListArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let profiles = match manager.list() {
        Ok(p) => p,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&ProfileListOutput {
            profiles: profiles.iter().map(ProfileInfo::from).collect(),
        });
    } else if profiles.is_empty() {
        formatter.println("No profiles configured.");
    } else {
        for profile in &profiles {
            formatter.println(&format_profile_line(&ProfileInfo::from(profile), args.long));
        }
    }
    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name.clone(),
                    message: format!("Profile '{}' removed successfully", args.name),
                });
            } else {
                formatter.success(&format!("Profile '{}' removed successfully.", args.name));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}

fn format_profile_line(info: &ProfileInfo, long: bool) -> String {
    let endpoint = info.endpoint.as_deref().unwrap_or("aws");
    if long {
        format!(
            "{:<12} {} (region: {}, credentials: {}, path-style: {})",
            info.name, endpoint, info.region, info.credentials, info.path_style
        )
    } else {
        format!("{:<12} {}", info.name, info.region)
    }
}
