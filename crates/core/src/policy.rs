//! Bucket access policies
//!
//! Only one policy shape is ever applied: anonymous `s3:GetObject` on every
//! object in the bucket, which is what static website hosting needs.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// IAM policy language version
pub const POLICY_VERSION: &str = "2012-10-17";

/// An S3 bucket policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

/// A single policy statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub sid: String,
    pub effect: String,
    pub principal: String,
    pub action: Vec<String>,
    pub resource: Vec<String>,
}

impl PolicyDocument {
    /// Policy granting anonymous read on every object in `bucket`
    ///
    /// The bucket name is not validated; exposing it is the caller's call.
    pub fn public_read(bucket: &str) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: vec![Statement {
                sid: "PublicReadGetObject".to_string(),
                effect: "Allow".to_string(),
                principal: "*".to_string(),
                action: vec!["s3:GetObject".to_string()],
                resource: vec![format!("arn:aws:s3:::{bucket}/*")],
            }],
        }
    }

    /// Serialize to the JSON form the provider expects
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_read_resource_arn() {
        let policy = PolicyDocument::public_read("my-site");
        assert_eq!(policy.statement.len(), 1);
        assert_eq!(policy.statement[0].resource, vec!["arn:aws:s3:::my-site/*"]);
    }

    #[test]
    fn test_public_read_json_shape() {
        let json = PolicyDocument::public_read("my-site").to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Sid": "PublicReadGetObject",
                    "Effect": "Allow",
                    "Principal": "*",
                    "Action": ["s3:GetObject"],
                    "Resource": ["arn:aws:s3:::my-site/*"]
                }]
            })
        );
    }
}
