//! Locate the project and solution files a generation request depends on.
//!
//! Explicit paths are trusted (after an existence check); otherwise the
//! repository is searched and exactly one match is required.

mod pattern;

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{FileKind, LocatorError};
use crate::request::GenerationRequest;
use crate::script::{ScriptPath, ScriptVar};
use crate::types::{ProjectType, SOLUTION_PATTERNS};

pub use pattern::FilePattern;

/// Directories never descended into while searching.
const SKIPPED_DIRS: &[&str] = &[".git", ".hg", ".svn", "node_modules"];

/// Concrete files and directories for one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedProject {
    pub project_type: ProjectType,
    pub repository_root: PathBuf,
    pub site_path: PathBuf,
    pub project_file: Option<PathBuf>,
    pub solution_file: Option<PathBuf>,
}

impl ResolvedProject {
    /// The deployable site directory.
    pub fn site_dir(&self) -> ScriptPath {
        ScriptPath::var(ScriptVar::DeploymentSite)
    }

    /// Project file addressed from `DEPLOYMENT_SOURCE`.
    pub fn project_file_in_source(&self) -> Option<ScriptPath> {
        self.project_file.as_deref().and_then(|p| self.in_source(p))
    }

    /// Like [`Self::project_file_in_source`], for strategies that cannot
    /// build without one.
    pub fn require_project_file(&self) -> Result<ScriptPath, LocatorError> {
        self.project_file_in_source()
            .ok_or_else(|| LocatorError::NotFound {
                kind: FileKind::Project,
                root: self.repository_root.clone(),
                patterns: self
                    .project_type
                    .requirements()
                    .project_patterns
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
            })
    }

    /// Directory holding the project file, addressed from `DEPLOYMENT_SOURCE`.
    pub fn project_dir_in_source(&self) -> Option<ScriptPath> {
        self.project_file_in_source().map(|p| p.parent())
    }

    pub fn solution_file_in_source(&self) -> Option<ScriptPath> {
        self.solution_file.as_deref().and_then(|p| self.in_source(p))
    }

    /// Directory the build runs in: the project directory, else the site.
    pub fn working_dir(&self) -> ScriptPath {
        self.project_dir_in_source()
            .unwrap_or_else(|| self.site_dir())
    }

    /// Project file name without extension.
    pub fn project_name(&self) -> Option<String> {
        self.project_file
            .as_deref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
    }

    fn in_source(&self, path: &Path) -> Option<ScriptPath> {
        ScriptPath::under(ScriptVar::DeploymentSource, &self.repository_root, path)
    }
}

/// Resolve the files `request` needs.
pub fn locate(request: &GenerationRequest) -> Result<ResolvedProject, LocatorError> {
    let root = request.repository_root();
    if !root.is_dir() {
        return Err(LocatorError::RepositoryRootMissing(root.to_path_buf()));
    }
    if !request.site_path().is_dir() {
        return Err(LocatorError::SiteMissing(request.site_path().to_path_buf()));
    }

    let project_type = request.project_type();
    let requirements = project_type.requirements();

    let project_file = match request.project_file() {
        Some(explicit) => Some(explicit_file(root, explicit, FileKind::Project)?),
        None if requirements.project_file => Some(find_single(
            root,
            &patterns(requirements.project_patterns),
            FileKind::Project,
        )?),
        None => None,
    };

    let solution_file = if request.no_solution() {
        tracing::debug!("solution lookup disabled");
        None
    } else {
        match request.solution_file() {
            Some(explicit) => Some(explicit_file(root, explicit, FileKind::Solution)?),
            None if requirements.solution_file => Some(find_single(
                root,
                &patterns(SOLUTION_PATTERNS),
                FileKind::Solution,
            )?),
            None => None,
        }
    };

    tracing::debug!(
        %project_type,
        project = ?project_file,
        solution = ?solution_file,
        "resolved project files"
    );

    Ok(ResolvedProject {
        project_type,
        repository_root: root.to_path_buf(),
        site_path: request.site_path().to_path_buf(),
        project_file,
        solution_file,
    })
}

/// Search `root` recursively for exactly one file matching any of `patterns`.
pub fn find_single(
    root: &Path,
    patterns: &[FilePattern],
    kind: FileKind,
) -> Result<PathBuf, LocatorError> {
    let mut candidates = find_all(root, patterns)?;
    tracing::debug!(
        root = %root.display(),
        %kind,
        count = candidates.len(),
        "searched for candidates"
    );

    match candidates.len() {
        0 => Err(LocatorError::NotFound {
            kind,
            root: root.to_path_buf(),
            patterns: pattern_names(patterns),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(LocatorError::Ambiguous {
            kind,
            root: root.to_path_buf(),
            patterns: pattern_names(patterns),
            candidates,
        }),
    }
}

/// Every file under `root` matching any of `patterns`, sorted.
pub fn find_all(root: &Path, patterns: &[FilePattern]) -> Result<Vec<PathBuf>, LocatorError> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| LocatorError::Walk {
            root: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matched = {
            let name = entry.file_name().to_string_lossy();
            patterns.iter().any(|p| p.matches(&name))
        };
        if matched {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    SKIPPED_DIRS.iter().any(|skipped| name == *skipped)
}

fn explicit_file(root: &Path, path: &Path, kind: FileKind) -> Result<PathBuf, LocatorError> {
    if !path.is_file() {
        return Err(LocatorError::ExplicitFileMissing {
            kind,
            path: path.to_path_buf(),
        });
    }
    if !path.starts_with(root) {
        return Err(LocatorError::OutsideRepository {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        });
    }
    tracing::debug!(path = %path.display(), %kind, "using explicit file");
    Ok(path.to_path_buf())
}

fn patterns(raw: &[&str]) -> Vec<FilePattern> {
    raw.iter().map(|p| FilePattern::parse(p)).collect()
}

fn pattern_names(patterns: &[FilePattern]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}
