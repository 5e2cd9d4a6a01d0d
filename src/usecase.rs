mod relpath;
mod solution;
mod workspace;

pub use relpath::relative_path;
pub use solution::Solution;
pub use workspace::{workspace_file_path, WorkspaceDocument, WORKSPACE_FILE_SUFFIX};
