//! Solution and project discovery.
//!
//! Supplies the list of output directories to clean: every project found in a
//! `.sln` file, or a project given directly by manifest or directory, yields
//! its `bin` and `obj` directories.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Output directory names removed for each project. Not configurable.
pub const OUTPUT_DIRS: &[&str] = &["bin", "obj"];

/// Project type GUID Visual Studio uses for solution folders
const SOLUTION_FOLDER_TYPE: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

/// A project whose output directories should be removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    /// Project file (e.g. `App.csproj`), when known
    pub manifest: Option<PathBuf>,
    pub dir: PathBuf,
}

impl Project {
    pub fn targets(&self) -> Vec<PathBuf> {
        target_paths(&self.dir)
    }
}

/// `{dir}/bin` and `{dir}/obj`, in that order
pub fn target_paths(dir: &Path) -> Vec<PathBuf> {
    OUTPUT_DIRS.iter().map(|name| dir.join(name)).collect()
}

/// Anything that can enumerate the projects of the current session
pub trait ProjectSource {
    fn projects(&self) -> Result<Vec<Project>>;
}

/// A Visual Studio solution file
#[derive(Debug, Clone)]
pub struct SolutionFile {
    path: PathBuf,
}

impl SolutionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SolutionFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectSource for SolutionFile {
    fn projects(&self) -> Result<Vec<Project>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read solution file {}", self.path.display()))?;
        let base = self.path.parent().unwrap_or_else(|| Path::new("."));
        Ok(parse_solution(&content, base))
    }
}

/// A single project given by its manifest file or its directory
#[derive(Debug, Clone)]
pub struct ProjectDir {
    path: PathBuf,
}

impl ProjectDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProjectDir { path: path.into() }
    }
}

impl ProjectSource for ProjectDir {
    fn projects(&self) -> Result<Vec<Project>> {
        let metadata = fs::metadata(&self.path)
            .with_context(|| format!("No such project: {}", self.path.display()))?;

        let project = if metadata.is_file() {
            let dir = match self.path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            Project {
                name: file_stem(&self.path),
                manifest: Some(self.path.clone()),
                dir,
            }
        } else {
            Project {
                name: self
                    .path
                    .canonicalize()
                    .ok()
                    .as_deref()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| self.path.display().to_string()),
                manifest: None,
                dir: self.path.clone(),
            }
        };

        Ok(vec![project])
    }
}

/// Extract the projects declared in solution file `content`.
/// Relative project paths are resolved against `base`.
pub fn parse_solution(content: &str, base: &Path) -> Vec<Project> {
    content
        .lines()
        .filter_map(parse_project_line)
        .filter(|(type_guid, _, _)| !type_guid.eq_ignore_ascii_case(SOLUTION_FOLDER_TYPE))
        .filter_map(|(_, name, rel_path)| {
            let manifest = base.join(normalize_separators(rel_path));
            // Entries without a file name are not buildable projects
            manifest.extension()?;
            let dir = manifest.parent()?.to_path_buf();
            Some(Project {
                name: name.to_string(),
                manifest: Some(manifest),
                dir,
            })
        })
        .collect()
}

/// Parse `Project("{TYPE}") = "Name", "path", "{GUID}"` into (type, name, path)
fn parse_project_line(line: &str) -> Option<(&str, &str, &str)> {
    let rest = line.trim().strip_prefix("Project(")?;
    let (type_part, rest) = rest.split_once(')')?;
    let type_guid = type_part
        .trim()
        .trim_matches('"')
        .trim_start_matches('{')
        .trim_end_matches('}');

    let (_, values) = rest.split_once('=')?;
    let mut fields = values.split(',').map(|f| f.trim().trim_matches('"'));
    let name = fields.next()?;
    let path = fields.next()?;
    if path.is_empty() {
        return None;
    }

    Some((type_guid, name, path))
}

/// Solution files always use `\`; split on both so either form resolves
fn normalize_separators(path: &str) -> PathBuf {
    path.split(['\\', '/'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_solution(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sln"))
}

/// Solution files directly inside `dir`, sorted by name
fn solutions_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut solutions = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && is_solution(&path) {
            solutions.push(path);
        }
    }
    solutions.sort();
    Ok(solutions)
}

/// Choose the project source for one command-line input
pub fn source_for(input: &Path) -> Result<Vec<Box<dyn ProjectSource>>> {
    if !input.exists() {
        bail!("No such solution or project: {}", input.display());
    }

    if input.is_file() {
        let source: Box<dyn ProjectSource> = if is_solution(input) {
            Box::new(SolutionFile::new(input))
        } else {
            Box::new(ProjectDir::new(input))
        };
        return Ok(vec![source]);
    }

    let solutions = solutions_in(input)?;
    if solutions.is_empty() {
        let source: Box<dyn ProjectSource> = Box::new(ProjectDir::new(input));
        Ok(vec![source])
    } else {
        Ok(solutions
            .into_iter()
            .map(|sln| Box::new(SolutionFile::new(sln)) as Box<dyn ProjectSource>)
            .collect())
    }
}

/// Enumerate the projects of every input, in order
pub fn discover_projects(inputs: &[PathBuf]) -> Result<Vec<Project>> {
    let mut projects = Vec::new();
    for input in inputs {
        for source in source_for(input)? {
            projects.extend(source.projects()?);
        }
    }
    Ok(projects)
}
