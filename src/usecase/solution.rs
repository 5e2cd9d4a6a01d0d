//! The loaded solution: member projects, their package lists, and the
//! switch and cleanup operations.

use std::path::{Path, PathBuf};

use msbuild_edit::FileReference;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::entity::Project;
use crate::error::{Error, Result};
use crate::usecase::relpath::relative_path;
use crate::usecase::workspace::WorkspaceDocument;

pub struct Solution {
    file_path: PathBuf,
    folder: PathBuf,
    projects: Vec<Project>,
    package_ids: Vec<String>,
}

impl Solution {
    pub fn new(file_path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = file_path.into();
        if file_path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("solution path is empty"));
        }
        let folder = file_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self {
            file_path,
            folder,
            projects: Vec::new(),
            package_ids: Vec::new(),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Union of package ids across all projects, deduplicated, first-seen
    /// order. Recomputed by every [`load`](Self::load).
    pub fn package_ids(&self) -> &[String] {
        &self.package_ids
    }

    /// (Re)load the member projects and their package lists. Prior state is
    /// discarded first, so reloading after on-disk changes is safe.
    pub fn load(&mut self) -> Result<()> {
        self.projects.clear();
        self.package_ids.clear();

        for solution_ref in sln_parser::parse_projects(&self.file_path)? {
            let mut project = Project::new(solution_ref.name, solution_ref.path);
            let full_path = project_full_path(&self.folder, &project);
            project.packages = msbuild_edit::list_package_references(&full_path)?;
            for package in &project.packages {
                if !self.package_ids.contains(&package.id) {
                    self.package_ids.push(package.id.clone());
                }
            }
            self.projects.push(project);
        }
        debug!(
            projects = self.projects.len(),
            packages = self.package_ids.len(),
            "solution loaded"
        );
        Ok(())
    }

    /// Replace package references with file references to the libraries
    /// recorded in `document`. The whole traversal runs on a blocking
    /// worker; the status report only becomes visible once every project
    /// was processed. On-disk project files are mutated, the in-memory
    /// model is not.
    pub async fn switch(&self, document: &WorkspaceDocument) -> Result<Vec<String>> {
        let folder = self.folder.clone();
        let projects = self.projects.clone();
        let document = document.clone();
        tokio::task::spawn_blocking(move || switch_projects(&folder, &projects, &document)).await?
    }

    /// Delete the `obj` directory beside each project file, one task per
    /// folder. A failed deletion contributes its own status line instead of
    /// suppressing the other results.
    pub async fn delete_obj_folders(&self) -> Result<Vec<String>> {
        let mut tasks = JoinSet::new();
        for project in &self.projects {
            let full_path = project_full_path(&self.folder, project);
            let Some(project_dir) = full_path.parent() else {
                continue;
            };
            let obj_folder = project_dir.join("obj");
            if !obj_folder.is_dir() {
                continue;
            }
            tasks.spawn(async move {
                match tokio::fs::remove_dir_all(&obj_folder).await {
                    Ok(()) => format!("Deleted: {}", obj_folder.display()),
                    Err(e) => {
                        warn!(folder = %obj_folder.display(), error = %e, "obj folder deletion failed");
                        format!("Failed to delete {}: {}", obj_folder.display(), e)
                    }
                }
            });
        }

        let mut messages = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            messages.push(joined?);
        }
        if messages.is_empty() {
            messages.push("No obj folders found to delete.".to_string());
        }
        Ok(messages)
    }
}

/// Manifest paths use backslashes; fold them into the platform separator so
/// the same solution opens on any host.
fn project_full_path(folder: &Path, project: &Project) -> PathBuf {
    folder.join(project.path.replace('\\', std::path::MAIN_SEPARATOR_STR))
}

fn switch_projects(
    folder: &Path,
    projects: &[Project],
    document: &WorkspaceDocument,
) -> Result<Vec<String>> {
    let mut messages = Vec::new();
    for project in projects {
        let full_path = project_full_path(folder, project);
        messages.push(format!("Updating project: {}", full_path.display()));

        for package in &project.packages {
            let selected = document.selections(&package.id);
            if selected.is_empty() {
                messages.push(format!("\tSkipping: {}, no libraries selected", package.id));
                continue;
            }
            messages.push(format!("\tUpdating: {}", package.id));

            messages.push(format!("\t\tRemove package: {}", package.id));
            msbuild_edit::remove_package_reference(&full_path, &package.id)?;

            let base = full_path
                .parent()
                .ok_or(Error::InvalidArgument("project file has no directory"))?;
            let mut references = Vec::new();
            for library in selected {
                let rel = relative_path(library, &base.to_string_lossy())?;
                let name = Path::new(&rel)
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                messages.push(format!("\t\tAdd reference: {rel}"));
                references.push(FileReference::new(name, rel));
            }
            msbuild_edit::add_file_references(&full_path, &references)?;
        }
    }
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project_xml(packages: &[(&str, &str)]) -> String {
        let mut refs = String::new();
        for (id, version) in packages {
            refs.push_str(&format!(
                "    <PackageReference Include=\"{id}\" Version=\"{version}\" />\n"
            ));
        }
        format!(
            "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <ItemGroup>\n{refs}  </ItemGroup>\n</Project>"
        )
    }

    fn write_solution(dir: &Path, projects: &[(&str, &[(&str, &str)])]) -> PathBuf {
        let mut sln = String::from(
            "Microsoft Visual Studio Solution File, Format Version 12.00\n",
        );
        for (name, packages) in projects {
            fs::create_dir_all(dir.join(name)).unwrap();
            fs::write(
                dir.join(name).join(format!("{name}.csproj")),
                project_xml(packages),
            )
            .unwrap();
            sln.push_str(&format!(
                "Project(\"{{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}\") = \"{name}\", \"{name}\\{name}.csproj\", \"{{11111111-2222-3333-4444-555555555555}}\"\nEndProject\n"
            ));
        }
        let sln_path = dir.join("App.sln");
        fs::write(&sln_path, sln).unwrap();
        sln_path
    }

    #[test]
    fn load_collects_deduplicated_package_ids_in_first_seen_order() {
        let dir = tempfile::tempdir().unwrap();
        let sln = write_solution(
            dir.path(),
            &[
                ("Alpha", &[("Newtonsoft.Json", "13.0.3"), ("Serilog", "3.1.1")]),
                ("Beta", &[("Newtonsoft.Json", "13.0.3"), ("Dapper", "2.1.35")]),
            ],
        );

        let mut solution = Solution::new(&sln).unwrap();
        solution.load().unwrap();

        assert_eq!(solution.projects().len(), 2);
        assert_eq!(
            solution.package_ids(),
            &["Newtonsoft.Json", "Serilog", "Dapper"]
        );
    }

    #[test]
    fn reload_resets_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let sln = write_solution(dir.path(), &[("Alpha", &[("Serilog", "3.1.1")])]);

        let mut solution = Solution::new(&sln).unwrap();
        solution.load().unwrap();
        assert_eq!(solution.package_ids(), &["Serilog"]);

        fs::write(
            dir.path().join("Alpha").join("Alpha.csproj"),
            project_xml(&[("Dapper", "2.1.35")]),
        )
        .unwrap();
        solution.load().unwrap();
        assert_eq!(solution.package_ids(), &["Dapper"]);
        assert_eq!(solution.projects().len(), 1);
    }

    #[test]
    fn solution_folder_entry_matching_a_real_directory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src").join("Alpha")).unwrap();
        fs::write(
            dir.path().join("src").join("Alpha").join("Alpha.csproj"),
            project_xml(&[("Serilog", "3.1.1")]),
        )
        .unwrap();
        // the "src" solution folder resolves to an existing directory on disk
        let sln = dir.path().join("App.sln");
        fs::write(
            &sln,
            "Microsoft Visual Studio Solution File, Format Version 12.00\n\
             Project(\"{2150E333-8FDC-42A3-9474-1A3956D46DE8}\") = \"src\", \"src\", \"{AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE}\"\nEndProject\n\
             Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Alpha\", \"src\\Alpha\\Alpha.csproj\", \"{11111111-2222-3333-4444-555555555555}\"\nEndProject\n",
        )
        .unwrap();

        let mut solution = Solution::new(&sln).unwrap();
        solution.load().unwrap();

        assert_eq!(solution.projects().len(), 2);
        assert!(solution.projects()[0].packages.is_empty());
        assert_eq!(solution.package_ids(), &["Serilog"]);
    }

    #[test]
    fn blank_solution_path_is_rejected() {
        assert!(matches!(
            Solution::new(""),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn switch_skips_packages_without_selections() {
        let dir = tempfile::tempdir().unwrap();
        let sln = write_solution(dir.path(), &[("Alpha", &[("Serilog", "3.1.1")])]);
        let mut solution = Solution::new(&sln).unwrap();
        solution.load().unwrap();

        let document = WorkspaceDocument::default();
        let messages = solution.switch(&document).await.unwrap();

        assert_eq!(messages.len(), 2);
        assert!(messages[1].contains("Skipping: Serilog"));
        // nothing touched on disk
        let content =
            fs::read_to_string(dir.path().join("Alpha").join("Alpha.csproj")).unwrap();
        assert!(content.contains("Serilog"));
    }

    #[tokio::test]
    async fn delete_obj_folders_removes_each_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let sln = write_solution(
            dir.path(),
            &[("Alpha", &[] as &[(&str, &str)]), ("Beta", &[])],
        );
        let alpha_obj = dir.path().join("Alpha").join("obj");
        fs::create_dir_all(alpha_obj.join("Debug")).unwrap();
        fs::write(alpha_obj.join("Debug").join("cache.bin"), b"x").unwrap();

        let mut solution = Solution::new(&sln).unwrap();
        solution.load().unwrap();
        let messages = solution.delete_obj_folders().await.unwrap();

        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Deleted: "));
        assert!(!alpha_obj.exists());
    }

    #[tokio::test]
    async fn delete_obj_folders_without_any_reports_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let sln = write_solution(dir.path(), &[("Alpha", &[] as &[(&str, &str)])]);
        let mut solution = Solution::new(&sln).unwrap();
        solution.load().unwrap();

        let messages = solution.delete_obj_folders().await.unwrap();
        assert_eq!(messages, vec!["No obj folders found to delete.".to_string()]);
    }
}
