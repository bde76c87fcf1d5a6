//! Local directory traversal for sync
//!
//! `LocalWalker` yields the regular files under a sync root depth-first,
//! pre-order: a subdirectory is fully visited before the entries that follow
//! it in its parent. Sibling order is whatever the filesystem returns.
//! The walker is lazy, so a sync uploads each file as soon as it is found.

use std::fmt;
use std::fs::{self, DirEntry, ReadDir};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::path::{object_key, resolve_root};

/// How symbolic links under a sync root are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymlinkPolicy {
    /// Upload link targets and descend into linked directories
    #[default]
    Follow,
    /// Ignore links
    Skip,
    /// Abort the walk at the first link
    Error,
}

impl FromStr for SymlinkPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "follow" => Ok(Self::Follow),
            "skip" => Ok(Self::Skip),
            "error" => Ok(Self::Error),
            other => Err(Error::Config(format!(
                "Unknown symlink policy '{other}'. Expected: follow, skip, or error"
            ))),
        }
    }
}

impl fmt::Display for SymlinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Follow => "follow",
            Self::Skip => "skip",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// A regular file found under the sync root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Path on disk
    pub path: PathBuf,
    /// Object key: path relative to the root, `/`-separated
    pub key: String,
    /// File size in bytes
    pub size: u64,
}

/// A directory being walked
struct Frame {
    path: PathBuf,
    /// Resolved path, for cycle detection
    canonical: PathBuf,
    entries: ReadDir,
}

/// Lazy depth-first walker over a sync root
///
/// Holds a stack of open directory iterators. After the first error the
/// walker is exhausted.
pub struct LocalWalker {
    root: PathBuf,
    policy: SymlinkPolicy,
    stack: Vec<Frame>,
}

impl LocalWalker {
    /// Resolve `root` and open it for walking
    pub fn new(root: &Path, policy: SymlinkPolicy) -> Result<Self> {
        let root = resolve_root(root)?;
        let entries = fs::read_dir(&root).map_err(|e| Error::traversal(&root, e.to_string()))?;

        Ok(Self {
            stack: vec![Frame {
                path: root.clone(),
                canonical: root.clone(),
                entries,
            }],
            root,
            policy,
        })
    }

    /// The resolved, canonical root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn visit(&mut self, entry: DirEntry) -> Result<Option<LocalFile>> {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| Error::traversal(&path, e.to_string()))?;

        if file_type.is_symlink() {
            match self.policy {
                SymlinkPolicy::Follow => {}
                SymlinkPolicy::Skip => {
                    tracing::warn!(path = %path.display(), "Skipping symbolic link");
                    return Ok(None);
                }
                SymlinkPolicy::Error => {
                    return Err(Error::traversal(&path, "symbolic links are not allowed"));
                }
            }
        }

        // Follows links, so a link reports its target's type.
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if file_type.is_symlink() && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Skipping dangling symbolic link");
                return Ok(None);
            }
            Err(e) => return Err(Error::traversal(&path, e.to_string())),
        };

        if metadata.is_dir() {
            let canonical =
                fs::canonicalize(&path).map_err(|e| Error::traversal(&path, e.to_string()))?;
            // Only a link back to a directory still being walked is a cycle;
            // other aliases of a directory are walked under their own path.
            if self.stack.iter().any(|frame| frame.canonical == canonical) {
                tracing::warn!(path = %path.display(), "Skipping symbolic link cycle");
                return Ok(None);
            }

            let entries = fs::read_dir(&path).map_err(|e| Error::traversal(&path, e.to_string()))?;
            tracing::debug!(path = %path.display(), "Descending into directory");
            self.stack.push(Frame {
                path,
                canonical,
                entries,
            });
            Ok(None)
        } else if metadata.is_file() {
            let key = object_key(&self.root, &path)?;
            Ok(Some(LocalFile {
                path,
                key,
                size: metadata.len(),
            }))
        } else {
            tracing::warn!(path = %path.display(), "Skipping non-regular file");
            Ok(None)
        }
    }
}

impl Iterator for LocalWalker {
    type Item = Result<LocalFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = {
                let frame = self.stack.last_mut()?;
                let dir = &frame.path;
                frame
                    .entries
                    .next()
                    .map(|entry| entry.map_err(|e| Error::traversal(dir.as_path(), e.to_string())))
            };

            match next {
                None => {
                    self.stack.pop();
                }
                Some(Ok(entry)) => match self.visit(entry) {
                    Ok(Some(file)) => return Some(Ok(file)),
                    Ok(None) => {}
                    Err(e) => {
                        self.stack.clear();
                        return Some(Err(e));
                    }
                },
                Some(Err(e)) => {
                    self.stack.clear();
                    return Some(Err(e));
                }
            }
        }
    }
}
