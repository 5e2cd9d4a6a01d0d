use std::fmt;

/// One project declaration from a solution file.
///
/// `path` is relative to the solution folder and is kept exactly as written,
/// backslashes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionRef {
    pub name: String,
    pub path: String,
}

impl SolutionRef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for SolutionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.path)
    }
}
