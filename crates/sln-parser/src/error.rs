use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlnError {
    #[error("solution file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
