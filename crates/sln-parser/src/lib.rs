//! # sln-parser
//!
//! Line-oriented parser for Visual Studio solution files.
//!
//! A `.sln` file is not XML; project membership is declared one line per
//! project. This crate extracts those declarations in file order and ignores
//! everything else (solution folders, nested sections, global sections).

mod entity;
mod error;
mod parser;

pub use entity::SolutionRef;
pub use error::SlnError;
pub use parser::parse_projects;
