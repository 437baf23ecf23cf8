//! Bottom-up removal of output directories.
//!
//! Each target root is emptied in passes: immediate files first, then immediate
//! subdirectories (recursively), then the root itself. Individual failures are
//! reported through the sink and never abort the run.

use crate::events::{CleanEvent, CleanFailure, FailureKind, Operation};

use std::fmt;
use std::fs;
use std::io;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

/// Default number of passes over a root before giving up on it
pub const DEFAULT_MAX_PASSES: u32 = 3;

/// Filesystem primitives used by the cleaner
pub trait Remover {
    fn remove_file(&self, path: &Path) -> io::Result<()>;
    fn remove_dir(&self, path: &Path) -> io::Result<()>;
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Immediate children of `dir` as (files, directories)
    fn list_children(&self, dir: &Path) -> io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        list_children(dir)
    }
}

/// Removes entries through `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct StdRemover;

impl Remover for StdRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
}

/// Options controlling cleanup behavior (runtime flags)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOptions {
    /// Emit an event for every successful removal, not just failures
    pub verbose: bool,
    /// Upper bound on passes over a single root
    pub max_passes: u32,
}

impl Default for CleanOptions {
    fn default() -> Self {
        CleanOptions {
            verbose: false,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Counters accumulated over a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanSummary {
    pub roots_processed: usize,
    pub directories_removed: usize,
    pub files_deleted: usize,
}

impl CleanSummary {
    pub fn is_empty(&self) -> bool {
        *self == CleanSummary::default()
    }
}

impl AddAssign for CleanSummary {
    fn add_assign(&mut self, other: Self) {
        self.roots_processed += other.roots_processed;
        self.directories_removed += other.directories_removed;
        self.files_deleted += other.files_deleted;
    }
}

impl fmt::Display for CleanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Top Level Files Deleted: {}\nDirectories Removed: {}\nProjects Cleaned: {}\n",
            self.files_deleted, self.directories_removed, self.roots_processed
        )
    }
}

/// The directory cleanup engine. Holds no state between runs.
pub struct Cleaner<R: Remover = StdRemover> {
    options: CleanOptions,
    remover: R,
}

impl Cleaner<StdRemover> {
    pub fn new(options: CleanOptions) -> Self {
        Cleaner::with_remover(options, StdRemover)
    }
}

impl<R: Remover> Cleaner<R> {
    /// `max_passes` below 1 is raised to 1 so every root gets one attempt
    pub fn with_remover(mut options: CleanOptions, remover: R) -> Self {
        options.max_passes = options.max_passes.max(1);
        Cleaner { options, remover }
    }

    pub fn options(&self) -> CleanOptions {
        self.options
    }

    /// Remove every target in order, reporting each action to `sink`.
    /// Targets that do not exist are skipped without any event.
    pub fn clean<F>(&self, targets: &[PathBuf], mut sink: F) -> CleanSummary
    where
        F: FnMut(CleanEvent),
    {
        let mut summary = CleanSummary::default();
        for target in targets {
            self.clean_root(target, &mut summary, &mut sink);
        }
        summary
    }

    fn clean_root<F>(&self, root: &Path, summary: &mut CleanSummary, sink: &mut F)
    where
        F: FnMut(CleanEvent),
    {
        if !is_real_dir(root) {
            return;
        }
        summary.roots_processed += 1;

        let mut passes = 0;
        while is_real_dir(root) {
            if passes >= self.options.max_passes {
                sink(CleanEvent::Failed(CleanFailure {
                    path: root.to_path_buf(),
                    operation: Operation::RemoveDirectory,
                    kind: FailureKind::Other,
                    message: format!("still present after {} passes", passes),
                }));
                break;
            }
            passes += 1;

            let (files, dirs) = match self.remover.list_children(root) {
                Ok(children) => children,
                Err(err) => {
                    sink(CleanEvent::Failed(CleanFailure::from_io(
                        root,
                        Operation::ReadDirectory,
                        &err,
                    )));
                    break;
                }
            };

            for file in files {
                match self.remover.remove_file(&file) {
                    Ok(()) => {
                        summary.files_deleted += 1;
                        if self.options.verbose {
                            sink(CleanEvent::FileDeleted(file));
                        }
                    }
                    Err(err) => sink(CleanEvent::Failed(CleanFailure::from_io(
                        &file,
                        Operation::RemoveFile,
                        &err,
                    ))),
                }
            }

            // Nested directories are not counted, only the root
            for dir in dirs {
                match self.remover.remove_dir_all(&dir) {
                    Ok(()) => {
                        if self.options.verbose {
                            sink(CleanEvent::DirectoryDeleted(dir));
                        }
                    }
                    Err(err) => sink(CleanEvent::Failed(CleanFailure::from_io(
                        &dir,
                        Operation::RemoveDirectory,
                        &err,
                    ))),
                }
            }

            match self.remover.remove_dir(root) {
                Ok(()) if is_real_dir(root) => continue,
                Ok(()) => {
                    summary.directories_removed += 1;
                    if self.options.verbose {
                        sink(CleanEvent::DirectoryDeleted(root.to_path_buf()));
                    }
                }
                Err(err) => {
                    sink(CleanEvent::Failed(CleanFailure::from_io(
                        root,
                        Operation::RemoveDirectory,
                        &err,
                    )));
                    break;
                }
            }
        }
    }
}

/// True only for an actual directory; a symlink is never followed
fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// Split the immediate children of `dir` into (files, directories).
/// Symlinks count as files so they are unlinked rather than followed.
fn list_children(dir: &Path) -> io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        } else {
            files.push(entry.path());
        }
    }

    files.sort();
    dirs.sort();
    Ok((files, dirs))
}
