use std::fmt;

use msbuild_edit::PackageRef;

/// One member project of a loaded solution.
///
/// Owned by the [`Solution`](crate::usecase::Solution) that parsed it;
/// `packages` is only refreshed by reloading the solution.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    /// Path relative to the solution folder, as written in the manifest.
    pub path: String,
    pub packages: Vec<PackageRef>,
}

impl Project {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            packages: Vec::new(),
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.path)
    }
}
