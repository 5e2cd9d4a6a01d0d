/// A NuGet package dependency declared in a project file.
///
/// Identity is `id`; a project may declare many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    pub id: String,
    pub version: String,
}

impl PackageRef {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

/// A direct assembly reference to write into a project file.
///
/// `hint_path` is expected to be relative to the project file's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub name: String,
    pub hint_path: String,
}

impl FileReference {
    pub fn new(name: impl Into<String>, hint_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint_path: hint_path.into(),
        }
    }
}
