//! Static website hosting configuration

use serde::Serialize;

/// Document served for directory requests
pub const INDEX_DOCUMENT: &str = "index.html";

/// Document served for 4xx errors
pub const ERROR_DOCUMENT: &str = "error.html";

// Regions whose website endpoint uses `s3-website-<region>` rather than
// `s3-website.<region>`.
const DASH_ENDPOINT_REGIONS: &[&str] = &[
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "eu-west-1",
    "sa-east-1",
    "us-gov-west-1",
];

/// Website configuration applied to a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebsiteConfig {
    /// Suffix appended to directory requests
    pub index_suffix: String,
    /// Key of the error document
    pub error_key: String,
}

impl WebsiteConfig {
    /// The fixed hosting configuration: `index.html` and `error.html`
    pub fn hosting() -> Self {
        Self {
            index_suffix: INDEX_DOCUMENT.to_string(),
            error_key: ERROR_DOCUMENT.to_string(),
        }
    }
}

/// Website endpoint host for `region`
pub fn website_endpoint(region: &str) -> String {
    if DASH_ENDPOINT_REGIONS.contains(&region) {
        format!("s3-website-{region}.amazonaws.com")
    } else {
        format!("s3-website.{region}.amazonaws.com")
    }
}

/// Public URL of a website bucket
pub fn website_url(bucket: &str, region: &str) -> String {
    format!("http://{bucket}.{}", website_endpoint(region))
}
