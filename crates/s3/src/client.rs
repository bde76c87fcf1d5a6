//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from wt-core.
//! Provider error codes are classified here so nothing above this layer
//! inspects SDK error strings.

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, ErrorDocument, IndexDocument,
    WebsiteConfiguration,
};

use wt_core::{
    BucketInfo, CreateBucketOutcome, Error, ListOptions, ListResult, ObjectInfo, ObjectStore,
    Profile, Result, WebsiteConfig, DEFAULT_REGION,
};

/// Page size requested from bucket listings
const BUCKET_PAGE_SIZE: i32 = 1000;

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    region: String,
}

impl S3Client {
    /// Create a new S3 client from a webotron profile
    pub async fn new(profile: &Profile) -> Result<Self> {
        if profile.region.is_empty() {
            return Err(Error::Config(format!(
                "Profile '{}' has no region",
                profile.name
            )));
        }

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(profile.region.clone()));

        if let Some((access_key, secret_key)) = profile.static_credentials() {
            let credentials = aws_credential_types::Credentials::new(
                access_key,
                secret_key,
                None, // session token
                None, // expiry
                "webotron-profile",
            );
            loader = loader.credentials_provider(credentials);
        }

        if let Some(endpoint) = &profile.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(profile.path_style)
            .build();

        tracing::debug!(profile = %profile.name, region = %profile.region, "Opened S3 session");
        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            region: profile.region.clone(),
        })
    }

    /// Create a client from the standard AWS configuration chain
    ///
    /// `aws_profile` selects a named profile from the shared AWS config
    /// files. The region falls back to `us-east-1` when none is configured.
    pub async fn from_env(aws_profile: Option<&str>, region: Option<&str>) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(name) = aws_profile {
            loader = loader.profile_name(name);
        }
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }

        let config = loader.load().await;
        let region = config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .region(aws_config::Region::new(region.clone()))
            .build();

        tracing::debug!(profile = ?aws_profile, region = %region, "Opened S3 session");
        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            region,
        })
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    fn region(&self) -> String {
        self.region.clone()
    }

    async fn list_buckets(
        &self,
        continuation_token: Option<String>,
    ) -> Result<ListResult<BucketInfo>> {
        let response = self
            .inner
            .list_buckets()
            .max_buckets(BUCKET_PAGE_SIZE)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| provider_error(e, "Failed to list buckets"))?;

        let items = response
            .buckets()
            .iter()
            .map(|b| {
                let mut info = BucketInfo::new(b.name().unwrap_or_default());
                info.region = b.bucket_region().map(str::to_string);
                info.creation_date = b
                    .creation_date()
                    .and_then(|d| jiff::Timestamp::from_second(d.secs()).ok());
                info
            })
            .collect();

        let continuation_token = response.continuation_token().map(str::to_string);
        Ok(ListResult {
            items,
            truncated: continuation_token.is_some(),
            continuation_token,
        })
    }

    async fn list_objects(
        &self,
        bucket: &str,
        options: ListOptions,
    ) -> Result<ListResult<ObjectInfo>> {
        let response = self
            .inner
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(options.prefix)
            .set_max_keys(options.max_keys)
            .set_continuation_token(options.continuation_token)
            .send()
            .await
            .map_err(|e| provider_error(e, &format!("Failed to list objects in {bucket}")))?;

        let items = response
            .contents()
            .iter()
            .map(|object| {
                let mut info =
                    ObjectInfo::new(object.key().unwrap_or_default(), object.size().unwrap_or(0));
                info.last_modified = object
                    .last_modified()
                    .and_then(|d| jiff::Timestamp::from_second(d.secs()).ok());
                info.etag = object.e_tag().map(|e| e.trim_matches('"').to_string());
                info.storage_class = object.storage_class().map(|s| s.as_str().to_string());
                info
            })
            .collect();

        Ok(ListResult {
            items,
            truncated: response.is_truncated().unwrap_or(false),
            continuation_token: response.next_continuation_token().map(str::to_string),
        })
    }

    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<String>,
    ) -> Result<CreateBucketOutcome> {
        let mut request = self.inner.create_bucket().bucket(bucket);

        if let Some(region) = location_constraint {
            let configuration = CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region.as_str()))
                .build();
            request = request.create_bucket_configuration(configuration);
        }

        match request.send().await {
            Ok(_) => Ok(CreateBucketOutcome::Created),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_bucket_already_owned_by_you()) =>
            {
                Ok(CreateBucketOutcome::AlreadyOwnedByYou)
            }
            Err(e) => Err(provider_error(e, &format!("Failed to create bucket {bucket}"))),
        }
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: String) -> Result<()> {
        self.inner
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|e| provider_error(e, &format!("Failed to set policy on {bucket}")))?;

        Ok(())
    }

    async fn put_bucket_website(&self, bucket: &str, config: &WebsiteConfig) -> Result<()> {
        let index = IndexDocument::builder()
            .suffix(&config.index_suffix)
            .build()
            .map_err(|e| Error::General(e.to_string()))?;
        let error = ErrorDocument::builder()
            .key(&config.error_key)
            .build()
            .map_err(|e| Error::General(e.to_string()))?;
        let website = WebsiteConfiguration::builder()
            .index_document(index)
            .error_document(error)
            .build();

        self.inner
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(website)
            .send()
            .await
            .map_err(|e| provider_error(e, &format!("Failed to configure website on {bucket}")))?;

        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<ObjectInfo> {
        let size = data.len() as i64;

        let response = self
            .inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .content_length(size)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| provider_error(e, &format!("Failed to upload {key}")))?;

        let mut info = ObjectInfo::new(key, size);
        info.etag = response.e_tag().map(|e| e.trim_matches('"').to_string());
        info.last_modified = Some(jiff::Timestamp::now());

        Ok(info)
    }
}

/// Convert an SDK error into a wt-core error by its provider error code
fn provider_error<E, R>(err: SdkError<E, R>, context: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err
        .as_service_error()
        .and_then(|e| e.code())
        .map(str::to_string);
    let message = format!("{context}: {}", DisplayErrorContext(&err));
    error_for_code(code.as_deref(), message)
}

fn error_for_code(code: Option<&str>, message: String) -> Error {
    match code {
        Some(
            "AccessDenied"
            | "AllAccessDisabled"
            | "InvalidAccessKeyId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken",
        ) => Error::Auth(message),
        Some("NoSuchBucket" | "NoSuchKey" | "NotFound") => Error::NotFound(message),
        Some(
            "BucketAlreadyExists"
            | "BucketAlreadyOwnedByYou"
            | "OperationAborted"
            | "InvalidBucketName"
            | "TooManyBuckets"
            | "IllegalLocationConstraintException"
            | "InvalidLocationConstraint",
        ) => Error::Conflict(message),
        _ => Error::Network(message),
    }
}
