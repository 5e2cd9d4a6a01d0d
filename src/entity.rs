mod project;

pub use project::Project;

// Re-export the leaf crates' types so callers see one surface
pub use msbuild_edit::{FileReference, PackageRef};
pub use sln_parser::SolutionRef;
