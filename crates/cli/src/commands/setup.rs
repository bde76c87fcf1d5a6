//! setup-bucket command
//!
//! Creates (or adopts) a bucket, makes its objects publicly readable, and
//! configures it for static website hosting.

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use wt_core::{Bucket, BucketManager, ObjectStore};

use super::{exit_code_for, open_session, validate_bucket_name, SessionArgs};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Create a bucket and configure it for public website hosting
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Bucket name
    pub bucket: String,
}

#[derive(Debug, Serialize)]
struct SetupOutput {
    status: &'static str,
    bucket: String,
    region: String,
    url: String,
}

/// Execute the setup-bucket command
pub async fn execute(
    args: SetupArgs,
    session: &SessionArgs,
    output_config: OutputConfig,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    if let Err(e) = validate_bucket_name(&args.bucket) {
        formatter.error(&e);
        return ExitCode::UsageError;
    }

    let client = match open_session(session).await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 client: {e:#}"));
            return exit_code_for(&e);
        }
    };

    match setup_bucket(&client, &args.bucket).await {
        Ok(bucket) => {
            let url = bucket.website_url();
            if formatter.is_json() {
                formatter.json(&SetupOutput {
                    status: "success",
                    bucket: bucket.name,
                    region: bucket.region,
                    url,
                });
            } else {
                formatter.success(&format!("Bucket '{}' is ready for hosting.", bucket.name));
                formatter.println(&url);
            }
            ExitCode::Success
        }
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            exit_code_for(&e)
        }
    }
}

async fn setup_bucket<S: ObjectStore>(store: &S, bucket_name: &str) -> anyhow::Result<Bucket> {
    let manager = BucketManager::new(store);

    let bucket = manager
        .init_bucket(bucket_name)
        .await
        .with_context(|| format!("Failed to create bucket '{bucket_name}'"))?;
    manager
        .set_policy(&bucket)
        .await
        .with_context(|| format!("Failed to set public policy on '{bucket_name}'"))?;
    manager
        .configure_website(&bucket)
        .await
        .with_context(|| format!("Failed to configure website on '{bucket_name}'"))?;

    Ok(bucket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use wt_core::{CreateBucketOutcome, MockObjectStore};

    #[tokio::test]
    async fn test_setup_bucket_runs_all_steps_in_order() {
        let mut store = MockObjectStore::new();
        let mut seq = Sequence::new();
        store.expect_region().return_const("eu-west-1".to_string());
        store
            .expect_create_bucket()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(CreateBucketOutcome::AlreadyOwnedByYou));
        store
            .expect_put_bucket_policy()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        store
            .expect_put_bucket_website()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let bucket = setup_bucket(&store, "my-site").await.unwrap();
        assert_eq!(bucket.region, "eu-west-1");
        assert_eq!(
            bucket.website_url(),
            "http://my-site.s3-website-eu-west-1.amazonaws.com"
        );
    }

    #[tokio::test]
    async fn test_setup_bucket_stops_on_conflict() {
        let mut store = MockObjectStore::new();
        store.expect_region().return_const("us-east-1".to_string());
        store
            .expect_create_bucket()
            .times(1)
            .returning(|_, _| Err(wt_core::Error::Conflict("owned by another account".into())));
        store.expect_put_bucket_policy().never();
        store.expect_put_bucket_website().never();

        let err = setup_bucket(&store, "taken").await.unwrap_err();
        assert_eq!(exit_code_for(&err), ExitCode::Conflict);
        assert!(format!("{err:#}").contains("Failed to create bucket 'taken'"));
    }
}
