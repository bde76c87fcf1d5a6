//! Bucket manager
//!
//! `BucketManager` provisions website buckets and mirrors local directories
//! into them. It borrows a session (any `ObjectStore`) for its lifetime and
//! issues provider calls strictly one at a time.

use std::path::{Path, PathBuf};

use futures::stream::{self, Stream, TryStreamExt};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::path::content_type_for;
use crate::policy::PolicyDocument;
use crate::traits::{
    BucketInfo, CreateBucketOutcome, ListOptions, ListResult, ObjectInfo, ObjectStore,
};
use crate::walk::{LocalFile, LocalWalker, SymlinkPolicy};
use crate::website::{website_url, WebsiteConfig};

/// The provider's default region, which rejects an explicit location constraint
pub const DEFAULT_REGION: &str = "us-east-1";

/// Page size requested from object listings
const LIST_PAGE_SIZE: i32 = 1000;

/// Location constraint to send when creating a bucket in `region`
pub fn location_constraint(region: &str) -> Option<&str> {
    if region.is_empty() || region == DEFAULT_REGION {
        None
    } else {
        Some(region)
    }
}

/// A bucket the manager has created or adopted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub name: String,
    pub region: String,
}

impl Bucket {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
        }
    }

    /// Public website URL for this bucket
    pub fn website_url(&self) -> String {
        website_url(&self.name, &self.region)
    }
}

/// Summary of a completed sync
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub bucket: String,
    pub root: PathBuf,
    pub objects: Vec<ObjectInfo>,
    pub total_bytes: u64,
}

impl SyncReport {
    fn new(bucket: &str, root: &Path) -> Self {
        Self {
            bucket: bucket.to_string(),
            root: root.to_path_buf(),
            objects: Vec::new(),
            total_bytes: 0,
        }
    }

    fn push(&mut self, object: ObjectInfo) {
        self.total_bytes += object.size_bytes.max(0) as u64;
        self.objects.push(object);
    }
}

/// Manages website buckets through a borrowed session
pub struct BucketManager<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    symlinks: SymlinkPolicy,
}

impl<'a, S: ObjectStore + ?Sized> BucketManager<'a, S> {
    /// Create a manager over `store`
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            symlinks: SymlinkPolicy::default(),
        }
    }

    /// Set how symbolic links are treated during sync
    pub fn with_symlink_policy(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = policy;
        self
    }

    /// Every bucket visible to the session
    ///
    /// The stream is lazy: pages are fetched as it is polled. Calling this
    /// again starts a fresh listing.
    pub fn all_buckets(&self) -> impl Stream<Item = Result<BucketInfo>> + 'a {
        let store = self.store;
        paginate(move |token| store.list_buckets(token))
    }

    /// Every object in `bucket_name`
    pub fn all_objects(&self, bucket_name: &str) -> impl Stream<Item = Result<ObjectInfo>> + 'a {
        let store = self.store;
        let bucket = bucket_name.to_string();
        paginate(move |token| {
            let bucket = bucket.clone();
            async move {
                let options = ListOptions {
                    max_keys: Some(LIST_PAGE_SIZE),
                    continuation_token: token,
                    ..Default::default()
                };
                store.list_objects(&bucket, options).await
            }
        })
    }

    /// Create `bucket_name` in the session's region, or adopt it if the
    /// caller already owns it
    pub async fn init_bucket(&self, bucket_name: &str) -> Result<Bucket> {
        let region = self.store.region();
        let constraint = location_constraint(&region).map(str::to_string);

        tracing::debug!(bucket = bucket_name, region = %region, "Creating bucket");
        match self.store.create_bucket(bucket_name, constraint).await? {
            CreateBucketOutcome::Created => {
                tracing::info!(bucket = bucket_name, region = %region, "Created bucket");
            }
            CreateBucketOutcome::AlreadyOwnedByYou => {
                tracing::info!(bucket = bucket_name, "Bucket already owned, reusing it");
            }
        }

        Ok(Bucket::new(bucket_name, region))
    }

    /// Make every object in `bucket` publicly readable
    pub async fn set_policy(&self, bucket: &Bucket) -> Result<()> {
        let policy = PolicyDocument::public_read(&bucket.name).to_json()?;
        tracing::debug!(bucket = %bucket.name, "Applying public read policy");
        self.store.put_bucket_policy(&bucket.name, policy).await
    }

    /// Configure `bucket` for static website hosting
    pub async fn configure_website(&self, bucket: &Bucket) -> Result<()> {
        let config = WebsiteConfig::hosting();
        tracing::debug!(
            bucket = %bucket.name,
            index = %config.index_suffix,
            error = %config.error_key,
            "Applying website configuration"
        );
        self.store.put_bucket_website(&bucket.name, &config).await
    }

    /// Upload the file at `path` to `key`, overwriting any existing object
    pub async fn upload_file(&self, bucket: &Bucket, path: &Path, key: &str) -> Result<ObjectInfo> {
        let content_type = content_type_for(key);
        let data = tokio::fs::read(path).await?;

        let mut info = self
            .store
            .put_object(&bucket.name, key, data, &content_type)
            .await?;
        tracing::info!(bucket = %bucket.name, key, content_type = %content_type, "Uploaded object");

        info.content_type = Some(content_type);
        Ok(info)
    }

    /// Files a sync of `pathname` would upload, without contacting the provider
    pub fn plan(&self, pathname: &Path) -> Result<Vec<LocalFile>> {
        LocalWalker::new(pathname, self.symlinks)?.collect()
    }

    /// Mirror the directory at `pathname` into `bucket_name`
    pub async fn sync(&self, pathname: &Path, bucket_name: &str) -> Result<SyncReport> {
        self.sync_with(pathname, bucket_name, |_| {}).await
    }

    /// Like `sync`, calling `on_upload` after each object is uploaded
    ///
    /// Uploads happen in traversal order. The first failure stops the sync;
    /// objects uploaded before it stay in place.
    pub async fn sync_with<F>(
        &self,
        pathname: &Path,
        bucket_name: &str,
        mut on_upload: F,
    ) -> Result<SyncReport>
    where
        F: FnMut(&ObjectInfo),
    {
        let bucket = Bucket::new(bucket_name, self.store.region());
        let walker = LocalWalker::new(pathname, self.symlinks)?;
        let mut report = SyncReport::new(bucket_name, walker.root());

        tracing::debug!(root = %walker.root().display(), bucket = bucket_name, "Starting sync");
        for file in walker {
            let file = file?;
            let info = self.upload_file(&bucket, &file.path, &file.key).await?;
            on_upload(&info);
            report.push(info);
        }

        Ok(report)
    }
}

/// Flatten a paginated listing into a lazy stream of items
///
/// Stops after a page that is not truncated, or that carries no token.
fn paginate<'a, T, F, Fut>(mut fetch: F) -> impl Stream<Item = Result<T>> + 'a
where
    T: 'a,
    F: FnMut(Option<String>) -> Fut + 'a,
    Fut: Future<Output = Result<ListResult<T>>> + 'a,
{
    // None: listing finished. Some(token): fetch the page at `token`.
    let start: Option<Option<String>> = Some(None);

    stream::try_unfold(start, move |cursor| {
        let page = cursor.map(&mut fetch);
        async move {
            let Some(page) = page else {
                return Ok(None);
            };
            let page = page.await?;
            let next = match (page.truncated, page.continuation_token) {
                (true, Some(token)) => Some(Some(token)),
                _ => None,
            };
            Ok::<_, Error>(Some((page.items, next)))
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, Error>)))
    .try_flatten()
}
