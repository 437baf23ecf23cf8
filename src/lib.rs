//! nukebuild - Build Output Remover
//!
//! nukebuild deletes the `bin` and `obj` output directories of every project in a
//! .NET solution. Each directory is emptied bottom-up (files, then subdirectories,
//! then the directory itself); failures on individual entries are reported and
//! the run carries on with the rest.
//!
//! ## Layout
//!
//! - `cleaner`: the removal engine and its summary counters
//! - `events`: progress and failure events delivered to a sink
//! - `solution`: project enumeration from `.sln` files, manifests and directories
//! - `session`: per-project orchestration and user notices
//! - `config`: embedded defaults plus optional TOML overrides

pub mod cleaner;
pub mod config;
pub mod events;
pub mod session;
pub mod solution;

// Re-export commonly used items
pub use cleaner::{CleanOptions, CleanSummary, Cleaner, Remover, StdRemover};
pub use config::Config;
pub use events::{CleanEvent, CleanFailure, FailureKind, Operation};
pub use session::{run_session, Notice, SessionEvent, SessionReport};
pub use solution::{
    discover_projects, parse_solution, target_paths, Project, ProjectDir, ProjectSource,
    SolutionFile, OUTPUT_DIRS,
};
