//! list-buckets command
//!
//! Lists every bucket visible to the session.

use clap::Args;
use futures::TryStreamExt;
use serde::Serialize;
use wt_core::{BucketInfo, BucketManager};

use super::{exit_code_for, open_session, SessionArgs};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List all buckets
#[derive(Args, Debug)]
pub struct ListBucketsArgs {
    /// Show the total number of buckets
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for list-buckets (JSON format)
#[derive(Debug, Serialize)]
struct ListBucketsOutput {
    buckets: Vec<BucketInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<usize>,
}

/// Execute the list-buckets command
pub async fn execute(
    args: ListBucketsArgs,
    session: &SessionArgs,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let client = match open_session(session).await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 client: {e:#}"));
            return exit_code_for(&e);
        }
    };
    let manager = BucketManager::new(&client);

    if formatter.is_json() {
        return match manager.all_buckets().try_collect::<Vec<_>>().await {
            Ok(buckets) => {
                let output = ListBucketsOutput {
                    total: args.summarize.then_some(buckets.len()),
                    buckets,
                };
                formatter.json(&output);
                ExitCode::Success
            }
            Err(e) => {
                formatter.error(&format!("Failed to list buckets: {e}"));
                ExitCode::from(&e)
            }
        };
    }

    // Print as pages arrive rather than waiting for the full listing.
    let mut buckets = Box::pin(manager.all_buckets());
    let mut count = 0usize;
    loop {
        match buckets.try_next().await {
            Ok(Some(bucket)) => {
                count += 1;
                formatter.println(&format_bucket_line(&bucket));
            }
            Ok(None) => break,
            Err(e) => {
                formatter.error(&format!("Failed to list buckets: {e}"));
                return ExitCode::from(&e);
            }
        }
    }

    if args.summarize {
        formatter.println(&format!("\nTotal: {count} buckets"));
    }
    ExitCode::Success
}

fn format_bucket_line(bucket: &BucketInfo) -> String {
    let date = bucket
        .creation_date
        .map(|d| d.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| " ".repeat(19));
    match &bucket.region {
        Some(region) => format!("[{date}] {} ({region})", bucket.name),
        None => format!("[{date}] {}", bucket.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bucket_line_with_region() {
        let mut bucket = BucketInfo::new("my-site");
        bucket.region = Some("eu-west-1".to_string());
        bucket.creation_date = Some(jiff::Timestamp::from_second(0).unwrap());

        assert_eq!(
            format_bucket_line(&bucket),
            "[1970-01-01 00:00:00] my-site (eu-west-1)"
        );
    }

    #[test]
    fn test_format_bucket_line_without_metadata() {
        let bucket = BucketInfo::new("my-site");
        assert_eq!(format_bucket_line(&bucket), format!("[{}] my-site", " ".repeat(19)));
    }
}
