//! Local path resolution and object key derivation
//!
//! A sync root is given as a user path (possibly `~`-relative) and resolved
//! to an absolute canonical directory. Every file under it maps to an object
//! key made of its path components relative to the root, joined with `/`.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Content type used when the key's extension is not recognised
pub const FALLBACK_CONTENT_TYPE: &str = "text/html";

/// Expand a leading `~` to the current user's home directory
///
/// Paths that do not start with `~` are returned unchanged, as are `~user`
/// forms, which are not supported.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let home = dirs::home_dir()
                .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;
            Ok(home.join(components.as_path()))
        }
        _ => Ok(path.to_path_buf()),
    }
}

/// Resolve a sync root to an absolute canonical directory
pub fn resolve_root(path: &Path) -> Result<PathBuf> {
    let expanded = expand_home(path)?;
    let root = std::fs::canonicalize(&expanded).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            Error::NotFound(format!("Directory not found: {}", expanded.display()))
        }
        _ => Error::traversal(&expanded, e.to_string()),
    })?;

    if !root.is_dir() {
        return Err(Error::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    Ok(root)
}

/// Object key for `file`, relative to `root`
///
/// Components are joined with `/` regardless of the platform separator.
pub fn object_key(root: &Path, file: &Path) -> Result<String> {
    let relative = file.strip_prefix(root).map_err(|_| {
        Error::InvalidPath(format!(
            "{} is not under {}",
            file.display(),
            root.display()
        ))
    })?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    Error::InvalidPath(format!("{} is not valid UTF-8", file.display()))
                })?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(Error::InvalidPath(format!(
                    "Cannot derive an object key from {}",
                    file.display()
                )));
            }
        }
    }

    if parts.is_empty() {
        return Err(Error::InvalidPath(format!(
            "Cannot derive an object key from {}",
            file.display()
        )));
    }

    Ok(parts.join("/"))
}

/// Content type for an object key, inferred from its extension
pub fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}
