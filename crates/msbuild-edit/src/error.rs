use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("project file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("no references provided")]
    NoReferences,
    #[error("failed to process {}: {message}", .path.display())]
    Xml { path: PathBuf, message: String },
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EditError {
    pub(crate) fn xml(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Xml {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
