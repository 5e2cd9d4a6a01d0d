//! The workspace document: which local libraries the user chose per package.
//!
//! Persisted as one JSON file per solution, next to the solution manifest.
//! Only the selections map is serialized; dirtiness is transient and gates
//! whether the host persists the document on close.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Suffix appended to the solution file name. A `.tmp` ending keeps the side
/// file out of version control with stock ignore rules.
pub const WORKSPACE_FILE_SUFFIX: &str = ".nuswitch.tmp";

/// Side file path for a given solution manifest.
pub fn workspace_file_path(solution_path: &Path) -> PathBuf {
    let mut os = solution_path.as_os_str().to_os_string();
    os.push(WORKSPACE_FILE_SUFFIX);
    PathBuf::from(os)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceDocument {
    #[serde(rename = "libraries")]
    selections: HashMap<String, Vec<String>>,
    #[serde(skip)]
    dirty: bool,
}

impl WorkspaceDocument {
    /// Load the document at `path`. An absent file is a fresh empty
    /// document, not an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(Error::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&content).map_err(|e| Error::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(|e| Error::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True if any package has at least one selected library.
    pub fn has_any_selections(&self) -> bool {
        self.selections.values().any(|libs| !libs.is_empty())
    }

    /// Record libraries for `package_id`. Only paths whose file name is not
    /// already present for that package are appended, so the same assembly
    /// from two build output folders cannot be selected twice.
    pub fn add_local_references(&mut self, package_id: &str, paths: &[String]) -> Result<()> {
        if package_id.trim().is_empty() {
            return Err(Error::InvalidArgument("package id is empty"));
        }
        if paths.is_empty() {
            return Err(Error::InvalidArgument("no libraries to add"));
        }
        let existing = self.selections.entry(package_id.to_string()).or_default();
        for path in paths {
            let name = file_name(path);
            if existing.iter().any(|p| file_name(p) == name) {
                continue;
            }
            existing.push(path.clone());
        }
        self.dirty = true;
        Ok(())
    }

    /// Drop exact paths from `package_id`'s list; paths not present are
    /// no-ops. A package that was never registered is an error.
    pub fn remove_libraries(&mut self, package_id: &str, paths: &[String]) -> Result<()> {
        if package_id.trim().is_empty() {
            return Err(Error::InvalidArgument("package id is empty"));
        }
        if paths.is_empty() {
            return Err(Error::InvalidArgument("no libraries to remove"));
        }
        let Some(existing) = self.selections.get_mut(package_id) else {
            return Err(Error::UnknownPackage(package_id.to_string()));
        };
        for path in paths {
            if let Some(pos) = existing.iter().position(|p| p == path) {
                existing.remove(pos);
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Selected libraries for `package_id`; empty when none were recorded.
    pub fn selections(&self, package_id: &str) -> &[String] {
        self.selections
            .get(package_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.selections
            .iter()
            .map(|(id, libs)| (id.as_str(), libs.as_slice()))
    }
}

/// Last path segment, accepting either separator style.
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
