//! Core engine for swapping NuGet package references in a Visual Studio
//! solution for direct references to locally built assemblies, and back.
//!
//! The host (the `nuswitch` binary here) supplies the solution path and the
//! chosen library paths and decides when the workspace document persists;
//! this crate never prompts and never touches version control.

pub mod entity;
pub mod error;
pub mod usecase;

pub use error::{Error, Result};
pub use usecase::{workspace_file_path, Solution, WorkspaceDocument};
