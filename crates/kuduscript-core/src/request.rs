//! Building a validated [`GenerationRequest`] from raw invocation options.

use std::path::{Component, Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::types::{ProjectType, ScriptType};

/// A project-type flag as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTypeFlag {
    pub project_type: ProjectType,
    /// Value attached to the flag (e.g. `--asp-wap <project>`), if any.
    pub project_file: Option<PathBuf>,
}

impl ProjectTypeFlag {
    pub fn new(project_type: ProjectType) -> Self {
        Self {
            project_type,
            project_file: None,
        }
    }

    pub fn with_project_file(project_type: ProjectType, path: impl Into<PathBuf>) -> Self {
        Self {
            project_type,
            project_file: Some(path.into()),
        }
    }
}

/// Raw, unvalidated options collected by a frontend.
#[derive(Debug, Clone, Default)]
pub struct InvocationOptions {
    /// Repository root (default: `.`)
    pub repository_root: Option<PathBuf>,
    /// Site directory (default: repository root)
    pub site_path: Option<PathBuf>,
    /// Directory receiving the script (default: repository root)
    pub output_path: Option<PathBuf>,
    pub script_type: Option<ScriptType>,
    pub solution_file: Option<PathBuf>,
    /// Project file given independently of the type flag
    pub project_file: Option<PathBuf>,
    /// Every project-type flag present on the command line
    pub project_types: Vec<ProjectTypeFlag>,
    pub no_dot_deployment: bool,
    pub no_solution: bool,
    pub include_dependencies: bool,
    pub dotnet_sdk: Option<String>,
}

impl InvocationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project_type(mut self, flag: ProjectTypeFlag) -> Self {
        self.project_types.push(flag);
        self
    }

    pub fn with_repository_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.repository_root = Some(path.into());
        self
    }

    pub fn with_site_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.site_path = Some(path.into());
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_script_type(mut self, script_type: ScriptType) -> Self {
        self.script_type = Some(script_type);
        self
    }

    pub fn with_solution_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.solution_file = Some(path.into());
        self
    }

    pub fn with_project_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_file = Some(path.into());
        self
    }

    pub fn with_no_dot_deployment(mut self, value: bool) -> Self {
        self.no_dot_deployment = value;
        self
    }

    pub fn with_no_solution(mut self, value: bool) -> Self {
        self.no_solution = value;
        self
    }

    pub fn with_include_dependencies(mut self, value: bool) -> Self {
        self.include_dependencies = value;
        self
    }

    pub fn with_dotnet_sdk(mut self, version: impl Into<String>) -> Self {
        self.dotnet_sdk = Some(version.into());
        self
    }

    /// The single selected project-type flag.
    ///
    /// Pure: performs no I/O, so callers can reject a bad invocation before
    /// touching the file system.
    pub fn selected_project_type(&self) -> Result<&ProjectTypeFlag, GenerateError> {
        match self.project_types.as_slice() {
            [flag] => Ok(flag),
            [] => Err(GenerateError::InvalidInvocation(format!(
                "Please specify one of these flags: {}",
                available_flags()
            ))),
            flags => {
                let given: Vec<String> = flags.iter().map(|f| f.project_type.flag()).collect();
                Err(GenerateError::InvalidInvocation(format!(
                    "Please specify only one of these flags: {} (got {})",
                    available_flags(),
                    given.join(", ")
                )))
            }
        }
    }
}

/// Immutable, fully resolved generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    repository_root: PathBuf,
    site_path: PathBuf,
    output_path: PathBuf,
    project_type: ProjectType,
    project_file: Option<PathBuf>,
    solution_file: Option<PathBuf>,
    script_type: ScriptType,
    no_dot_deployment: bool,
    no_solution: bool,
    include_dependencies: bool,
    dotnet_sdk: Option<String>,
    extra_excludes: Vec<String>,
}

impl GenerationRequest {
    /// Resolve `options` against `cwd`, filling gaps from `config`.
    ///
    /// Flags win over configuration, which wins over built-in defaults.
    pub fn build(
        options: &InvocationOptions,
        cwd: &Path,
        config: &GeneratorConfig,
    ) -> Result<Self, GenerateError> {
        let flag = options.selected_project_type()?;

        let repository_root = resolve_path(
            cwd,
            options.repository_root.as_deref().unwrap_or(Path::new(".")),
        );
        let site_path = options
            .site_path
            .as_deref()
            .map(|p| resolve_path(cwd, p))
            .unwrap_or_else(|| repository_root.clone());
        let output_path = options
            .output_path
            .as_deref()
            .map(|p| resolve_path(cwd, p))
            .unwrap_or_else(|| repository_root.clone());

        let project_file = first_non_empty([
            flag.project_file.as_deref(),
            options.project_file.as_deref(),
        ])
        .map(|p| resolve_path(cwd, p));
        let solution_file = first_non_empty([options.solution_file.as_deref()])
            .map(|p| resolve_path(cwd, p));

        let dotnet_sdk = options
            .dotnet_sdk
            .clone()
            .or_else(|| config.dotnet_sdk.clone())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            repository_root,
            site_path,
            output_path,
            project_type: flag.project_type,
            project_file,
            solution_file,
            script_type: options
                .script_type
                .or(config.script_type)
                .unwrap_or_default(),
            no_dot_deployment: options.no_dot_deployment
                || config.dot_deployment == Some(false),
            no_solution: options.no_solution,
            include_dependencies: options.include_dependencies
                || config.include_dependencies.unwrap_or(false),
            dotnet_sdk,
            extra_excludes: config.exclude.clone(),
        })
    }

    pub fn repository_root(&self) -> &Path {
        &self.repository_root
    }

    pub fn site_path(&self) -> &Path {
        &self.site_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn project_type(&self) -> ProjectType {
        self.project_type
    }

    pub fn project_file(&self) -> Option<&Path> {
        self.project_file.as_deref()
    }

    pub fn solution_file(&self) -> Option<&Path> {
        self.solution_file.as_deref()
    }

    pub fn script_type(&self) -> ScriptType {
        self.script_type
    }

    pub fn no_dot_deployment(&self) -> bool {
        self.no_dot_deployment
    }

    pub fn no_solution(&self) -> bool {
        self.no_solution
    }

    pub fn include_dependencies(&self) -> bool {
        self.include_dependencies
    }

    pub fn dotnet_sdk(&self) -> Option<&str> {
        self.dotnet_sdk.as_deref()
    }

    pub fn extra_excludes(&self) -> &[String] {
        &self.extra_excludes
    }

    /// Full path of the script this request produces.
    pub fn script_path(&self) -> PathBuf {
        self.output_path.join(self.script_type.file_name())
    }
}

/// First candidate that is present and non-empty, in list order.
pub fn first_non_empty<'a, I>(candidates: I) -> Option<&'a Path>
where
    I: IntoIterator<Item = Option<&'a Path>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|p| !p.as_os_str().is_empty())
}

/// Join `path` onto `cwd` and fold `.`/`..` components lexically.
pub fn resolve_path(cwd: &Path, path: &Path) -> PathBuf {
    normalize(&cwd.join(path))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn available_flags() -> String {
    ProjectType::ALL
        .iter()
        .map(|t| t.flag())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_skips_missing_and_empty() {
        let empty = Path::new("");
        let chosen = first_non_empty([None, Some(empty), Some(Path::new("b.csproj"))]);
        assert_eq!(chosen, Some(Path::new("b.csproj")));
    }

    #[test]
    fn first_non_empty_keeps_order() {
        let chosen = first_non_empty([Some(Path::new("a")), Some(Path::new("b"))]);
        assert_eq!(chosen, Some(Path::new("a")));
    }

    #[test]
    fn first_non_empty_of_nothing_is_none() {
        assert_eq!(first_non_empty([None, Some(Path::new(""))]), None);
    }

    #[test]
    fn resolve_path_folds_dot_segments() {
        let resolved = resolve_path(Path::new("/work/repo"), Path::new("./site/../out"));
        assert_eq!(resolved, PathBuf::from("/work/repo/out"));
    }

    #[test]
    fn resolve_path_keeps_absolute_input() {
        let resolved = resolve_path(Path::new("/work"), Path::new("/srv/app"));
        assert_eq!(resolved, PathBuf::from("/srv/app"));
    }
}
