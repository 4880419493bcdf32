//! Typed errors surfaced by the generation engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::script::Phase;
use crate::types::ProjectType;

/// Top-level failure of a generation request.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Zero or several project-type flags were selected.
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),

    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// No strategy is registered for the requested type.
    #[error("no generation strategy registered for project type '{0}'")]
    UnsupportedType(ProjectType),

    /// A strategy emitted a step from an earlier phase after a later one.
    #[error("strategy for '{project_type}' emitted a {after:?} step after a {before:?} step")]
    StepOrder {
        project_type: ProjectType,
        before: Phase,
        after: Phase,
    },

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Failure to resolve the files a project type needs.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("repository root is not a directory: {}", .0.display())]
    RepositoryRootMissing(PathBuf),

    #[error("site path is not a directory: {}", .0.display())]
    SiteMissing(PathBuf),

    #[error("{kind} file does not exist: {}", .path.display())]
    ExplicitFileMissing { kind: FileKind, path: PathBuf },

    #[error(
        "{} must be inside the repository root {}",
        .path.display(),
        .root.display()
    )]
    OutsideRepository { path: PathBuf, root: PathBuf },

    #[error(
        "no {kind} file matching {} found under {}; specify the path explicitly",
        .patterns.join(", "),
        .root.display()
    )]
    NotFound {
        kind: FileKind,
        root: PathBuf,
        patterns: Vec<String>,
    },

    #[error(
        "found {} {kind} files matching {} under {}: {}; specify which one to use",
        .candidates.len(),
        .patterns.join(", "),
        .root.display(),
        display_candidates(.candidates)
    )]
    Ambiguous {
        kind: FileKind,
        root: PathBuf,
        patterns: Vec<String>,
        candidates: Vec<PathBuf>,
    },

    #[error("failed to search {}: {message}", .root.display())]
    Walk { root: PathBuf, message: String },
}

/// Which kind of file the locator was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Project,
    Solution,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Project => f.write_str("project"),
            FileKind::Solution => f.write_str("solution"),
        }
    }
}

/// Failure while persisting generated files.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("overwrite confirmation failed: {source}")]
    Prompt {
        #[source]
        source: std::io::Error,
    },
}

fn display_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
