//! Read-only discovery of package references.

use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::attr_value;
use crate::entity::PackageRef;
use crate::error::EditError;

/// List the `PackageReference` entries of a project file, in document order.
///
/// The package id comes from the `Include` attribute; the version from the
/// `Version` attribute or, failing that, a `Version` child element. Entries
/// missing either are skipped. A path that does not name an existing file
/// yields an empty list; solution manifests declare entries, such as
/// solution folders, that never exist as project files on disk.
pub fn list_package_references(path: &Path) -> Result<Vec<PackageRef>, EditError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|e| EditError::io(path, e))?;

    let mut reader = Reader::from_str(&content);
    let mut packages = Vec::new();
    // (id, version attribute) of the PackageReference currently open
    let mut open: Option<(Option<String>, Option<String>)> = None;
    let mut child_depth = 0usize;
    let mut in_version = false;
    let mut version_text: Option<String> = None;

    loop {
        match reader.read_event().map_err(|e| EditError::xml(path, e))? {
            Event::Eof => break,
            Event::Empty(e) => {
                if open.is_none() && e.local_name().as_ref() == b"PackageReference" {
                    let id = attr_value(&e, b"Include", path)?;
                    let version = attr_value(&e, b"Version", path)?;
                    push_package(&mut packages, id, version);
                }
            }
            Event::Start(e) => {
                if open.is_none() {
                    if e.local_name().as_ref() == b"PackageReference" {
                        open = Some((
                            attr_value(&e, b"Include", path)?,
                            attr_value(&e, b"Version", path)?,
                        ));
                        child_depth = 0;
                        version_text = None;
                    }
                } else {
                    child_depth += 1;
                    in_version = child_depth == 1 && e.local_name().as_ref() == b"Version";
                }
            }
            Event::Text(t) if in_version => {
                let text = t.unescape().map_err(|e| EditError::xml(path, e))?;
                let text = text.trim();
                if !text.is_empty() {
                    version_text = Some(text.to_string());
                }
            }
            Event::End(e) => {
                if open.is_some() {
                    if child_depth == 0 && e.local_name().as_ref() == b"PackageReference" {
                        if let Some((id, version_attr)) = open.take() {
                            // the attribute wins over the child element
                            push_package(&mut packages, id, version_attr.or(version_text.take()));
                        }
                    } else {
                        child_depth = child_depth.saturating_sub(1);
                        in_version = false;
                    }
                }
            }
            _ => {}
        }
    }
    Ok(packages)
}

fn push_package(packages: &mut Vec<PackageRef>, id: Option<String>, version: Option<String>) {
    if let (Some(id), Some(version)) = (id, version) {
        if !id.is_empty() && !version.is_empty() {
            packages.push(PackageRef::new(id, version));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_project(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("App.csproj");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn lists_sdk_style_attribute_versions() {
        let (_dir, path) = write_project(
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json" Version="13.0.3" />
    <PackageReference Include="Serilog" Version="3.1.1" />
  </ItemGroup>
</Project>"#,
        );
        let packages = list_package_references(&path).unwrap();
        assert_eq!(
            packages,
            vec![
                PackageRef::new("Newtonsoft.Json", "13.0.3"),
                PackageRef::new("Serilog", "3.1.1"),
            ]
        );
    }

    #[test]
    fn version_child_element_and_default_namespace() {
        let (_dir, path) = write_project(
            r#"<Project xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <ItemGroup>
    <PackageReference Include="Foo">
      <Version>1.2.3</Version>
    </PackageReference>
  </ItemGroup>
</Project>"#,
        );
        let packages = list_package_references(&path).unwrap();
        assert_eq!(packages, vec![PackageRef::new("Foo", "1.2.3")]);
    }

    #[test]
    fn attribute_wins_over_child_element() {
        let (_dir, path) = write_project(
            r#"<Project>
  <ItemGroup>
    <PackageReference Include="Foo" Version="2.0.0">
      <Version>1.0.0</Version>
    </PackageReference>
  </ItemGroup>
</Project>"#,
        );
        let packages = list_package_references(&path).unwrap();
        assert_eq!(packages, vec![PackageRef::new("Foo", "2.0.0")]);
    }

    #[test]
    fn incomplete_entries_are_skipped() {
        let (_dir, path) = write_project(
            r#"<Project>
  <ItemGroup>
    <PackageReference Include="NoVersion" />
    <PackageReference Version="1.0.0" />
    <PackageReference Include="Kept" Version="0.1.0" />
  </ItemGroup>
</Project>"#,
        );
        let packages = list_package_references(&path).unwrap();
        assert_eq!(packages, vec![PackageRef::new("Kept", "0.1.0")]);
    }

    #[test]
    fn missing_file_yields_empty_list() {
        let packages =
            list_package_references(Path::new("/nonexistent/App.csproj")).unwrap();
        assert!(packages.is_empty());
    }

    #[test]
    fn directory_path_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let packages = list_package_references(dir.path()).unwrap();
        assert!(packages.is_empty());
    }
}
