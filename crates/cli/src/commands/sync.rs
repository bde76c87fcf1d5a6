//! sync command
//!
//! Uploads every file under a local directory to a bucket, keyed by its
//! path relative to the directory. Uploads run one at a time and stop at the
//! first failure; objects already uploaded stay in the bucket.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use wt_core::{content_type_for, BucketManager, LocalFile, SymlinkPolicy, SyncReport};

use super::{exit_code_for, open_session, validate_bucket_name, SessionArgs};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload the contents of a local directory to a bucket
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Local directory to upload (may start with ~)
    pub pathname: String,

    /// Destination bucket
    pub bucket: String,

    /// Only show what would be uploaded
    #[arg(long)]
    pub dry_run: bool,

    /// How to treat symbolic links: follow, skip, or error
    /// (default: from config, else follow)
    #[arg(long)]
    pub symlinks: Option<SymlinkPolicy>,
}

#[derive(Debug, Serialize)]
struct PlannedUpload {
    path: String,
    key: String,
    content_type: String,
    size_bytes: u64,
}

impl From<&LocalFile> for PlannedUpload {
    fn from(file: &LocalFile) -> Self {
        Self {
            path: file.path.display().to_string(),
            key: file.key.clone(),
            content_type: content_type_for(&file.key),
            size_bytes: file.size,
        }
    }
}

#[derive(Debug, Serialize)]
struct DryRunOutput {
    status: &'static str,
    bucket: String,
    uploads: Vec<PlannedUpload>,
}

/// Execute the sync command
///
/// `default_symlinks` is the configured policy, used when `--symlinks` is absent.
pub async fn execute(
    args: SyncArgs,
    session: &SessionArgs,
    output_config: OutputConfig,
    default_symlinks: SymlinkPolicy,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if let Err(e) = validate_bucket_name(&args.bucket) {
        formatter.error(&e);
        return ExitCode::UsageError;
    }

    let policy = args.symlinks.unwrap_or(default_symlinks);
    let pathname = PathBuf::from(&args.pathname);

    if args.dry_run {
        return dry_run(&args, &pathname, policy, &formatter);
    }

    let client = match open_session(session).await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 client: {e:#}"));
            return exit_code_for(&e);
        }
    };
    let manager = BucketManager::new(&client).with_symlink_policy(policy);

    let progress = ProgressBar::spinner(formatter.config(), "Syncing...");
    let verbose = !formatter.is_json() && !progress.is_visible();
    let on_upload = |info: &wt_core::ObjectInfo| {
        progress.uploaded(&info.key, info.size_bytes.max(0) as u64);
        if verbose {
            formatter.println(&format!("{} ({})", info.key, info.size_human));
        }
    };

    let result = tokio::select! {
        result = manager.sync_with(&pathname, &args.bucket, on_upload) => result,
        _ = tokio::signal::ctrl_c() => {
            progress.finish_and_clear();
            formatter.warning("Sync interrupted; objects uploaded so far remain in the bucket.");
            return ExitCode::Interrupted;
        }
    };
    progress.finish_and_clear();

    match result {
        Ok(report) => {
            if formatter.is_json() {
                formatter.json(&report);
            } else {
                formatter.success(&summary(&report));
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("Sync of {} to {} failed: {e}", args.pathname, args.bucket));
            ExitCode::from(&e)
        }
    }
}

fn dry_run(
    args: &SyncArgs,
    pathname: &std::path::Path,
    policy: SymlinkPolicy,
    formatter: &Formatter,
) -> ExitCode {
    // Planning walks the local tree only; no session is needed.
    let walker = match wt_core::LocalWalker::new(pathname, policy) {
        Ok(w) => w,
        Err(e) => {
            formatter.error(&format!("Cannot read {}: {e}", args.pathname));
            return ExitCode::from(&e);
        }
    };

    let mut uploads = Vec::new();
    for file in walker {
        match file {
            Ok(file) => {
                let planned = PlannedUpload::from(&file);
                if !formatter.is_json() {
                    formatter.println(&format!(
                        "Would upload: {} -> {}/{} ({})",
                        planned.path, args.bucket, planned.key, planned.content_type
                    ));
                }
                uploads.push(planned);
            }
            Err(e) => {
                formatter.error(&format!("Cannot read {}: {e}", args.pathname));
                return ExitCode::from(&e);
            }
        }
    }

    if formatter.is_json() {
        formatter.json(&DryRunOutput {
            status: "dry-run",
            bucket: args.bucket.clone(),
            uploads,
        });
    }
    ExitCode::Success
}

fn summary(report: &SyncReport) -> String {
    format!(
        "Uploaded {} file(s), {}, from {} to {}.",
        report.objects.len(),
        humansize::format_size(report.total_bytes, humansize::BINARY),
        report.root.display(),
        report.bucket
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use wt_core::ObjectInfo;

    fn args(pathname: &str) -> SyncArgs {
        SyncArgs {
            pathname: pathname.to_string(),
            bucket: "my-site".to_string(),
            dry_run: true,
            symlinks: Some(SymlinkPolicy::Follow),
        }
    }

    #[test]
    fn test_planned_upload_content_type() {
        let file = LocalFile {
            path: PathBuf::from("/srv/site/data.unknownext"),
            key: "data.unknownext".to_string(),
            size: 3,
        };
        let planned = PlannedUpload::from(&file);
        assert_eq!(planned.content_type, "text/html");
        assert_eq!(planned.size_bytes, 3);
    }

    #[test]
    fn test_dry_run_succeeds_without_session() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("index.html"), "<html/>").unwrap();

        let path = temp_dir.path().to_string_lossy().to_string();
        let formatter = Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        });
        let code = dry_run(&args(&path), temp_dir.path(), SymlinkPolicy::Follow, &formatter);
        assert_eq!(code, ExitCode::Success);
    }

    #[test]
    fn test_dry_run_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let formatter = Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        });
        let code = dry_run(&args("missing"), &missing, SymlinkPolicy::Follow, &formatter);
        assert_eq!(code, ExitCode::NotFound);
    }

    #[test]
    fn test_dry_run_honours_symlink_policy() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("index.html"), "<html/>").unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(
            temp_dir.path().join("index.html"),
            temp_dir.path().join("alias.html"),
        )
        .unwrap();

        let formatter = Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        });
        let code = dry_run(&args("site"), temp_dir.path(), SymlinkPolicy::Skip, &formatter);
        assert_eq!(code, ExitCode::Success);

        #[cfg(unix)]
        {
            let code = dry_run(&args("site"), temp_dir.path(), SymlinkPolicy::Error, &formatter);
            assert_eq!(code, ExitCode::GeneralError);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_configured_symlink_policy_applies_without_flag() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("index.html"), "<html/>").unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("index.html"),
            temp_dir.path().join("alias.html"),
        )
        .unwrap();

        let mut sync_args = args(&temp_dir.path().to_string_lossy());
        sync_args.symlinks = None;
        let output_config = OutputConfig {
            quiet: true,
            ..Default::default()
        };
        let code = execute(
            sync_args,
            &SessionArgs::default(),
            output_config,
            SymlinkPolicy::Error,
        )
        .await;
        assert_eq!(code, ExitCode::GeneralError);
    }

    #[test]
    fn test_summary_line() {
        let report = SyncReport {
            bucket: "my-site".to_string(),
            root: PathBuf::from("/srv/site"),
            objects: vec![ObjectInfo::new("index.html", 10), ObjectInfo::new("a.css", 20)],
            total_bytes: 30,
        };
        assert_eq!(
            summary(&report),
            "Uploaded 2 file(s), 30 B, from /srv/site to my-site."
        );
    }
}
