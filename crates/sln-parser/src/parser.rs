use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::entity::SolutionRef;
use crate::error::SlnError;

static PROJECT_LINE_RE: OnceLock<Regex> = OnceLock::new();

fn project_line_re() -> &'static Regex {
    PROJECT_LINE_RE.get_or_init(|| {
        Regex::new(r#"^Project\("\{[^}]+\}"\)\s*=\s*"([^"]+)",\s*"([^"]+)",\s*"\{[^}]+\}""#)
            .unwrap()
    })
}

/// Extract the member projects declared in a solution file, in file order.
///
/// Lines that do not match the project declaration shape are skipped. No
/// check is made that the declared project paths exist; callers resolve and
/// open them later.
pub fn parse_projects(path: &Path) -> Result<Vec<SolutionRef>, SlnError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SlnError::NotFound(path.to_path_buf()),
        _ => SlnError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let mut projects = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| SlnError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if let Some(caps) = project_line_re().captures(&line) {
            projects.push(SolutionRef::new(&caps[1], &caps[2]));
        }
    }
    Ok(projects)
}
