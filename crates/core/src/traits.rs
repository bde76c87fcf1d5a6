//! ObjectStore trait definition
//!
//! This trait defines the provider calls webotron needs from an S3-compatible
//! service. Provider error codes are classified by the implementation, so
//! callers only ever see `CreateBucketOutcome` or a closed `Error` kind.

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::website::WebsiteConfig;

/// A bucket as reported by a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    /// Bucket name
    pub name: String,

    /// Region the bucket lives in, when the provider reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<Timestamp>,
}

impl BucketInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: None,
            creation_date: None,
        }
    }
}

/// Metadata for an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key
    pub key: String,

    /// Size in bytes
    pub size_bytes: i64,

    /// Human-readable size
    pub size_human: String,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    /// ETag (usually MD5 for single-part uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Storage class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    /// Content type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl ObjectInfo {
    /// Create a new ObjectInfo for an object of `size` bytes
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: size,
            size_human: humansize::format_size(size.max(0) as u64, humansize::BINARY),
            last_modified: None,
            etag: None,
            storage_class: None,
            content_type: None,
        }
    }
}

/// One page of a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResult<T> {
    /// Listed items
    pub items: Vec<T>,

    /// Whether the result is truncated (more items available)
    pub truncated: bool,

    /// Continuation token for the next page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

impl<T> ListResult<T> {
    /// A final page holding `items`
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            truncated: false,
            continuation_token: None,
        }
    }
}

/// Options for object listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of keys to return per request
    pub max_keys: Option<i32>,

    /// Prefix to filter by
    pub prefix: Option<String>,

    /// Continuation token for pagination
    pub continuation_token: Option<String>,
}

/// Successful result of a create-bucket call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateBucketOutcome {
    /// The bucket did not exist and was created
    Created,
    /// The bucket already exists and belongs to the caller
    AlreadyOwnedByYou,
}

/// Trait for the storage provider calls webotron makes
///
/// Implemented by the S3 adapter and mocked for testing. Names owned by
/// another account surface as `Error::Conflict` from `create_bucket`.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Region the session is bound to
    fn region(&self) -> String;

    /// List one page of buckets
    async fn list_buckets(&self, continuation_token: Option<String>)
    -> Result<ListResult<BucketInfo>>;

    /// List one page of objects in a bucket
    async fn list_objects(&self, bucket: &str, options: ListOptions)
    -> Result<ListResult<ObjectInfo>>;

    /// Create a bucket, optionally pinned to a location constraint
    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<String>,
    ) -> Result<CreateBucketOutcome>;

    /// Replace the bucket policy with a JSON policy document
    async fn put_bucket_policy(&self, bucket: &str, policy: String) -> Result<()>;

    /// Replace the bucket website configuration
    async fn put_bucket_website(&self, bucket: &str, config: &WebsiteConfig) -> Result<()>;

    /// Upload an object, overwriting any object at the same key
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<ObjectInfo>;
}
