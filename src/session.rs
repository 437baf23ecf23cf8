//! Cleaning every project of a session and collecting user notices.

use crate::cleaner::{CleanSummary, Cleaner, Remover};
use crate::events::{CleanEvent, CleanFailure, FailureKind, Operation};
use crate::solution::Project;

use std::collections::BTreeSet;
use std::fmt;

/// Blocking messages shown to the user once per failure class.
///
/// Only project-level problems raise one: a refused permission anywhere, or a
/// bin/obj directory that could not be listed. Other per-entry failures are
/// just logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Notice {
    PermissionDenied,
    Generic,
}

impl Notice {
    pub fn title(&self) -> Option<&'static str> {
        match self {
            Notice::PermissionDenied => Some("Something has gone wrong :("),
            Notice::Generic => None,
        }
    }

    /// The notice a failure raises, if any
    pub fn for_failure(failure: &CleanFailure) -> Option<Notice> {
        let project_level = failure.kind == FailureKind::PermissionDenied
            || failure.operation == Operation::ReadDirectory;
        project_level.then(|| failure.kind.into())
    }

    pub fn message(&self) -> &'static str {
        match self {
            Notice::PermissionDenied => {
                "Your current user does not have permissions to delete the bin/obj folders, \
                 try running again with elevated privileges."
            }
            Notice::Generic => "Something has gone wrong, please try again.",
        }
    }
}

impl From<FailureKind> for Notice {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::PermissionDenied => Notice::PermissionDenied,
            FailureKind::Other => Notice::Generic,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// What the session reports to its caller, in order
#[derive(Debug)]
pub enum SessionEvent<'a> {
    /// Emitted before any of the project's targets is touched
    ProjectStarted(&'a Project),
    Clean(&'a Project, CleanEvent),
}

/// Outcome of cleaning a whole session
#[derive(Debug, Default)]
pub struct SessionReport {
    pub summary: CleanSummary,
    pub projects_seen: usize,
    pub notices: BTreeSet<Notice>,
}

/// Clean the output directories of each project in order.
///
/// Every cleaner event is forwarded to `sink` tagged with its project.
/// Failures that `Notice::for_failure` maps to a notice raise it; each notice
/// appears in the report at most once.
pub fn run_session<R, F>(projects: &[Project], cleaner: &Cleaner<R>, mut sink: F) -> SessionReport
where
    R: Remover,
    F: FnMut(SessionEvent<'_>),
{
    let mut report = SessionReport::default();

    for project in projects {
        report.projects_seen += 1;
        sink(SessionEvent::ProjectStarted(project));

        let notices = &mut report.notices;
        let summary = cleaner.clean(&project.targets(), |event| {
            if let CleanEvent::Failed(failure) = &event {
                notices.extend(Notice::for_failure(failure));
            }
            sink(SessionEvent::Clean(project, event));
        });

        report.summary += summary;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::{CleanOptions, StdRemover};
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    struct DenyAll;

    impl Remover for DenyAll {
        fn remove_file(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }

        fn remove_dir(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }

        fn remove_dir_all(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }
    }

    fn project_with_outputs(root: &Path, name: &str, files: &[&str]) -> Project {
        let dir = root.join(name);
        for target in ["bin", "obj"] {
            fs::create_dir_all(dir.join(target)).unwrap();
            for file in files {
                fs::write(dir.join(target).join(file), "data").unwrap();
            }
        }
        Project {
            name: name.to_string(),
            manifest: Some(dir.join(format!("{}.csproj", name))),
            dir,
        }
    }

    #[test]
    fn test_session_merges_project_summaries() {
        let root = tempdir().unwrap();
        let projects = vec![
            project_with_outputs(root.path(), "App", &["App.dll", "App.pdb"]),
            project_with_outputs(root.path(), "Lib", &["Lib.dll"]),
        ];

        let cleaner: Cleaner<StdRemover> = Cleaner::new(CleanOptions::default());
        let report = run_session(&projects, &cleaner, |_| {});

        assert_eq!(report.projects_seen, 2);
        assert_eq!(report.summary.roots_processed, 4);
        assert_eq!(report.summary.directories_removed, 4);
        assert_eq!(report.summary.files_deleted, 6);
        assert!(report.notices.is_empty());
        for project in &projects {
            assert!(project.targets().iter().all(|t| !t.exists()));
        }
    }

    #[test]
    fn test_project_without_outputs_counts_nothing() {
        let root = tempdir().unwrap();
        let projects = vec![Project {
            name: "Fresh".to_string(),
            manifest: None,
            dir: root.path().join("Fresh"),
        }];

        let mut started = 0;
        let mut events = 0;
        let cleaner = Cleaner::new(CleanOptions::default());
        let report = run_session(&projects, &cleaner, |event| match event {
            SessionEvent::ProjectStarted(_) => started += 1,
            SessionEvent::Clean(..) => events += 1,
        });

        assert_eq!(started, 1);
        assert_eq!(events, 0);
        assert_eq!(report.projects_seen, 1);
        assert!(report.summary.is_empty());
    }

    #[test]
    fn test_permission_notice_raised_once() {
        let root = tempdir().unwrap();
        let projects = vec![
            project_with_outputs(root.path(), "A", &["a.dll"]),
            project_with_outputs(root.path(), "B", &["b.dll"]),
        ];

        let mut seen: Vec<(String, PathBuf)> = Vec::new();
        let cleaner = Cleaner::with_remover(CleanOptions::default(), DenyAll);
        let report = run_session(&projects, &cleaner, |event| {
            if let SessionEvent::Clean(project, event) = event {
                seen.push((project.name.clone(), event.path().to_path_buf()));
            }
        });

        assert_eq!(
            report.notices.into_iter().collect::<Vec<_>>(),
            vec![Notice::PermissionDenied]
        );
        assert_eq!(report.summary.directories_removed, 0);
        assert_eq!(report.summary.roots_processed, 4);
        assert!(seen.iter().any(|(name, _)| name == "A"));
        assert!(seen.iter().any(|(name, _)| name == "B"));
    }

    /// Refuses to delete `*.locked` files; everything else goes to `std::fs`
    struct LockedFiles;

    impl Remover for LockedFiles {
        fn remove_file(&self, path: &Path) -> io::Result<()> {
            if path.extension().is_some_and(|ext| ext == "locked") {
                return Err(io::Error::new(io::ErrorKind::Other, "file in use"));
            }
            fs::remove_file(path)
        }

        fn remove_dir(&self, path: &Path) -> io::Result<()> {
            fs::remove_dir(path)
        }

        fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            fs::remove_dir_all(path)
        }
    }

    #[test]
    fn test_locked_file_is_only_logged() {
        let root = tempdir().unwrap();
        let projects = vec![project_with_outputs(root.path(), "App", &["x.dll.locked"])];

        let mut failures = 0;
        let cleaner = Cleaner::with_remover(CleanOptions::default(), LockedFiles);
        let report = run_session(&projects, &cleaner, |event| {
            if let SessionEvent::Clean(_, event) = event {
                failures += usize::from(event.is_failure());
            }
        });

        // Each root: the locked file, then the non-empty directory
        assert_eq!(failures, 4);
        assert!(report.notices.is_empty());
    }

    /// Lists nothing: every directory read fails
    struct Unlistable;

    impl Remover for Unlistable {
        fn remove_file(&self, path: &Path) -> io::Result<()> {
            fs::remove_file(path)
        }

        fn remove_dir(&self, path: &Path) -> io::Result<()> {
            fs::remove_dir(path)
        }

        fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            fs::remove_dir_all(path)
        }

        fn list_children(&self, _dir: &Path) -> io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
            Err(io::Error::new(io::ErrorKind::Other, "device not ready"))
        }
    }

    #[test]
    fn test_unlistable_root_raises_generic_notice() {
        let root = tempdir().unwrap();
        let projects = vec![
            project_with_outputs(root.path(), "App", &["App.dll"]),
            project_with_outputs(root.path(), "Lib", &["Lib.dll"]),
        ];

        let cleaner = Cleaner::with_remover(CleanOptions::default(), Unlistable);
        let report = run_session(&projects, &cleaner, |_| {});

        assert_eq!(
            report.notices.into_iter().collect::<Vec<_>>(),
            vec![Notice::Generic]
        );
        assert_eq!(report.summary.roots_processed, 4);
        assert_eq!(report.summary.files_deleted, 0);
        assert!(root.path().join("App/bin/App.dll").exists());
    }

    #[test]
    fn test_notice_for_failure() {
        let failure = |operation, kind| CleanFailure {
            path: PathBuf::from("/proj/obj"),
            operation,
            kind,
            message: String::new(),
        };

        assert_eq!(
            Notice::for_failure(&failure(Operation::RemoveFile, FailureKind::PermissionDenied)),
            Some(Notice::PermissionDenied)
        );
        assert_eq!(
            Notice::for_failure(&failure(Operation::ReadDirectory, FailureKind::Other)),
            Some(Notice::Generic)
        );
        assert_eq!(
            Notice::for_failure(&failure(Operation::RemoveFile, FailureKind::Other)),
            None
        );
        assert_eq!(
            Notice::for_failure(&failure(Operation::RemoveDirectory, FailureKind::Other)),
            None
        );
    }

    #[test]
    fn test_notice_messages() {
        assert!(Notice::PermissionDenied.message().contains("elevated"));
        assert_eq!(
            Notice::Generic.to_string(),
            "Something has gone wrong, please try again."
        );
        assert_eq!(Notice::from(FailureKind::Other), Notice::Generic);
        assert!(Notice::PermissionDenied.title().is_some());
        assert_eq!(Notice::Generic.title(), None);
    }
}
