//! Error types for wt-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for wt-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for wt-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid local path or object key
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Profile not found
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Profile already exists
    #[error("Profile already exists: {0}")]
    ProfileExists(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication or permission error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or provider error
    #[error("Network error: {0}")]
    Network(String),

    /// Conflict error, e.g. a bucket name owned by another account
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Failure while walking the local sync root
    #[error("Cannot traverse {}: {message}", path.display())]
    Traversal { path: PathBuf, message: String },

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) => 2,                            // UsageError
            Error::Config(_) => 2,                                 // UsageError
            Error::Network(_) => 3,                                // NetworkError
            Error::Auth(_) => 4,                                   // AuthError
            Error::NotFound(_) | Error::ProfileNotFound(_) => 5,   // NotFound
            Error::Conflict(_) | Error::ProfileExists(_) => 6,     // Conflict
            _ => 1,                                                // GeneralError
        }
    }

    /// Build a traversal error for `path`
    pub fn traversal(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Traversal {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidPath("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::ProfileNotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::Conflict("test".into()).exit_code(), 6);
        assert_eq!(Error::ProfileExists("test".into()).exit_code(), 6);
        assert_eq!(Error::traversal("/tmp/x", "loop").exit_code(), 1);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::ProfileNotFound("prod".into());
        assert_eq!(err.to_string(), "Profile not found: prod");

        let err = Error::traversal("/srv/site/link", "symbolic links are not allowed");
        assert_eq!(
            err.to_string(),
            "Cannot traverse /srv/site/link: symbolic links are not allowed"
        );
    }
}
