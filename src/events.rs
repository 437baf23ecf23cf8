//! Progress and failure events emitted while cleaning.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Broad class of a failed filesystem operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// The OS refused the operation for the current user
    PermissionDenied,
    /// Anything else (locked file, directory not empty, I/O error)
    Other,
}

impl From<io::ErrorKind> for FailureKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
            _ => FailureKind::Other,
        }
    }
}

/// The operation that was being attempted when a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RemoveFile,
    RemoveDirectory,
    ReadDirectory,
}

/// A single failed operation, reported instead of aborting the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanFailure {
    pub path: PathBuf,
    pub operation: Operation,
    pub kind: FailureKind,
    pub message: String,
}

impl CleanFailure {
    pub fn from_io(path: &Path, operation: Operation, err: &io::Error) -> Self {
        CleanFailure {
            path: path.to_path_buf(),
            operation,
            kind: err.kind().into(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for CleanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation {
            Operation::RemoveFile => write!(
                f,
                "Delete Failed ({}) for file '{}'",
                self.message,
                self.path.display()
            ),
            Operation::RemoveDirectory => write!(
                f,
                "Delete Failed ({}) for directory '{}'",
                self.message,
                self.path.display()
            ),
            Operation::ReadDirectory => write!(
                f,
                "Listing Failed ({}) for directory '{}'",
                self.message,
                self.path.display()
            ),
        }
    }
}

/// One action taken by the cleaner, delivered to the sink in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanEvent {
    FileDeleted(PathBuf),
    DirectoryDeleted(PathBuf),
    Failed(CleanFailure),
}

impl CleanEvent {
    pub fn is_failure(&self) -> bool {
        matches!(self, CleanEvent::Failed(_))
    }

    pub fn path(&self) -> &Path {
        match self {
            CleanEvent::FileDeleted(path) | CleanEvent::DirectoryDeleted(path) => path,
            CleanEvent::Failed(failure) => &failure.path,
        }
    }
}

impl fmt::Display for CleanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanEvent::FileDeleted(path) => write!(f, "Removed file '{}'", path.display()),
            CleanEvent::DirectoryDeleted(path) => {
                write!(f, "Removed directory '{}'", path.display())
            }
            CleanEvent::Failed(failure) => write!(f, "{}", failure),
        }
    }
}
