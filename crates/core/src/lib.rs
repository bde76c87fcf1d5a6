//! wt-core: Core library for the webotron static site publisher
//!
//! This crate provides the core functionality for webotron, including:
//! - Configuration and profile management
//! - Local path resolution and object key derivation
//! - The ObjectStore trait the S3 adapter implements
//! - BucketManager, which provisions website buckets and syncs directories
//!
//! This crate is independent of any specific S3 SDK, so the manager can be
//! exercised against mocks.

pub mod config;
pub mod error;
pub mod manager;
pub mod path;
pub mod policy;
pub mod profile;
pub mod traits;
pub mod walk;
pub mod website;

pub use config::{Config, ConfigManager, Defaults};
pub use error::{Error, Result};
pub use manager::{location_constraint, Bucket, BucketManager, SyncReport, DEFAULT_REGION};
pub use path::{content_type_for, expand_home, object_key, resolve_root};
pub use policy::PolicyDocument;
pub use profile::{Profile, ProfileManager};
pub use traits::{
    BucketInfo, CreateBucketOutcome, ListOptions, ListResult, ObjectInfo, ObjectStore,
};
pub use walk::{LocalFile, LocalWalker, SymlinkPolicy};
pub use website::{website_url, WebsiteConfig};

#[cfg(any(test, feature = "test-export-mocks"))]
pub use traits::MockObjectStore;
