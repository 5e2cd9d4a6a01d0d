//! Portable relative path computation.

use std::path::{Component, MAIN_SEPARATOR_STR};

use crate::error::{Error, Result};

/// Relative path from `base` to `target`, using `..` hops up to the longest
/// common ancestor and the platform separator throughout.
///
/// Both inputs are made absolute lexically (`.` and `..` folded, no
/// filesystem access) and directory segments compare case-insensitively,
/// matching how the manifests treat paths. Returns `"."` when the two
/// locations coincide.
pub fn relative_path(target: &str, base: &str) -> Result<String> {
    if target.trim().is_empty() {
        return Err(Error::InvalidArgument("target path is empty"));
    }
    if base.trim().is_empty() {
        return Err(Error::InvalidArgument("base path is empty"));
    }

    let target_parts = segments(target)?;
    let base_parts = segments(base)?;

    let mut common = 0usize;
    while common < target_parts.len()
        && common < base_parts.len()
        && target_parts[common].to_lowercase() == base_parts[common].to_lowercase()
    {
        common += 1;
    }

    let mut parts: Vec<&str> = Vec::new();
    for _ in common..base_parts.len() {
        parts.push("..");
    }
    parts.extend(target_parts[common..].iter().map(String::as_str));

    if parts.is_empty() {
        return Ok(".".to_string());
    }
    Ok(parts.join(MAIN_SEPARATOR_STR))
}

/// Absolute, lexically normalized directory segments of a path. Trailing
/// separators disappear with the component walk.
fn segments(path: &str) -> Result<Vec<String>> {
    let absolute = std::path::absolute(path)
        .map_err(|_| Error::InvalidArgument("path cannot be made absolute"))?;
    let mut parts: Vec<String> = Vec::new();
    for component in absolute.components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                parts.pop();
            }
            Component::Prefix(prefix) => {
                parts.push(prefix.as_os_str().to_string_lossy().into_owned());
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }
    Ok(parts)
}
