//! list-bucket-objects command
//!
//! Lists every object in a bucket.

use clap::Args;
use futures::TryStreamExt;
use serde::Serialize;
use wt_core::{BucketManager, ObjectInfo};

use super::{exit_code_for, open_session, SessionArgs};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List the objects in a bucket
#[derive(Args, Debug)]
pub struct ListObjectsArgs {
    /// Bucket name
    pub bucket: String,

    /// Show totals after the listing
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for list-bucket-objects (JSON format)
#[derive(Debug, Serialize)]
struct ListObjectsOutput {
    bucket: String,
    items: Vec<ObjectInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

impl Summary {
    fn add(&mut self, object: &ObjectInfo) {
        self.total_objects += 1;
        self.total_size_bytes += object.size_bytes;
    }

    fn finish(mut self) -> Self {
        self.total_size_human =
            humansize::format_size(self.total_size_bytes.max(0) as u64, humansize::BINARY);
        self
    }
}

/// Execute the list-bucket-objects command
pub async fn execute(
    args: ListObjectsArgs,
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

    let mut objects = Box::pin(manager.all_objects(&args.bucket));
    let mut items = Vec::new();
    let mut summary = Summary::default();

    loop {
        match objects.try_next().await {
            Ok(Some(object)) => {
                summary.add(&object);
                if formatter.is_json() {
                    items.push(object);
                } else {
                    formatter.println(&format_object_line(&object));
                }
            }
            Ok(None) => break,
            Err(e) => {
                formatter.error(&format!("Failed to list objects in {}: {e}", args.bucket));
                return ExitCode::from(&e);
            }
        }
    }

    let summary = summary.finish();
    if formatter.is_json() {
        let output = ListObjectsOutput {
            bucket: args.bucket,
            items,
            summary: args.summarize.then_some(summary),
        };
        formatter.json(&output);
    } else if args.summarize {
        formatter.println(&format!(
            "\nTotal: {} objects, {}",
            summary.total_objects, summary.total_size_human
        ));
    }

    ExitCode::Success
}

fn format_object_line(object: &ObjectInfo) -> String {
    let date = object
        .last_modified
        .map(|d| d.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| " ".repeat(19));
    format!("[{date}] {:>9} {}", object.size_human, object.key)
}
