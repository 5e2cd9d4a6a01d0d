//! # msbuild-edit
//!
//! Read and edit package and assembly references in MSBuild project files.
//!
//! Three operations against one `.csproj` file, each independently
//! transactional: the document is loaded, rewritten in memory, and written
//! back only on success. A failed call leaves the file untouched.
//!
//! Element lookups match on local names, so both SDK-style projects and
//! old-style projects carrying the MSBuild default namespace on the root
//! element are handled.

mod edit;
mod entity;
mod error;
mod scan;

pub use edit::{add_file_references, remove_package_reference};
pub use entity::{FileReference, PackageRef};
pub use error::EditError;
pub use scan::list_package_references;

use std::path::Path;

use quick_xml::events::BytesStart;

/// Unescaped value of the attribute with the given local name, if present.
pub(crate) fn attr_value(
    element: &BytesStart,
    name: &[u8],
    path: &Path,
) -> Result<Option<String>, EditError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| EditError::xml(path, e))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|e| EditError::xml(path, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}
