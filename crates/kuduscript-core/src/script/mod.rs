//! In-memory model of a deployment script.
//!
//! Strategies produce an ordered list of [`ScriptStep`]s; the renderer turns
//! them into literal text for one [`ScriptType`](crate::types::ScriptType).

pub mod marker;
pub mod render;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use marker::DeploymentMarker;
pub use render::{RenderContext, ScriptDocument, render};

/// Variables every generated script defines.
///
/// Each one is assigned only when the environment does not already provide
/// it, so a hosting platform can relocate the script by overriding them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ScriptVar {
    /// Repository root.
    DeploymentSource,
    /// Directory holding the deployable site.
    DeploymentSite,
    /// Directory holding the generated script.
    DeploymentOutput,
    Artifacts,
    /// Directory receiving the synchronized site.
    DeploymentTarget,
    NextManifestPath,
    PreviousManifestPath,
    KuduSyncCmd,
    /// Scratch directory for build output.
    DeploymentTemp,
    MsBuildPath,
}

impl ScriptVar {
    pub fn name(self) -> &'static str {
        match self {
            ScriptVar::DeploymentSource => "DEPLOYMENT_SOURCE",
            ScriptVar::DeploymentSite => "DEPLOYMENT_SITE",
            ScriptVar::DeploymentOutput => "DEPLOYMENT_OUTPUT",
            ScriptVar::Artifacts => "ARTIFACTS",
            ScriptVar::DeploymentTarget => "DEPLOYMENT_TARGET",
            ScriptVar::NextManifestPath => "NEXT_MANIFEST_PATH",
            ScriptVar::PreviousManifestPath => "PREVIOUS_MANIFEST_PATH",
            ScriptVar::KuduSyncCmd => "KUDU_SYNC_CMD",
            ScriptVar::DeploymentTemp => "DEPLOYMENT_TEMP",
            ScriptVar::MsBuildPath => "MSBUILD_PATH",
        }
    }
}

/// A path rooted at a script variable, e.g. `%DEPLOYMENT_SOURCE%\src\app.csproj`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScriptPath {
    pub base: ScriptVar,
    pub relative: Vec<String>,
}

impl ScriptPath {
    pub fn var(base: ScriptVar) -> Self {
        Self {
            base,
            relative: Vec::new(),
        }
    }

    pub fn join(mut self, segment: impl Into<String>) -> Self {
        self.relative.push(segment.into());
        self
    }

    /// Express `path` relative to `root` as a path under `base`.
    ///
    /// Returns `None` when `path` is not inside `root`.
    pub fn under(base: ScriptVar, root: &Path, path: &Path) -> Option<Self> {
        let rest = path.strip_prefix(root).ok()?;
        Some(Self {
            base,
            relative: path_segments(rest),
        })
    }

    /// Parent directory, staying at the base variable when already there.
    pub fn parent(&self) -> Self {
        let mut relative = self.relative.clone();
        relative.pop();
        Self {
            base: self.base,
            relative,
        }
    }
}

/// Split a relative path into its normal components.
pub(crate) fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

/// Program invoked by a command step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Program {
    /// Executable resolved from `PATH`.
    Tool(String),
    /// Executable whose location is held in a variable.
    Var(ScriptVar),
}

/// A single command-line argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Arg {
    Literal(String),
    Path(ScriptPath),
    /// `prefix` immediately followed by a quoted path, e.g. `/p:OutDir="..."`.
    Prefixed { prefix: String, path: ScriptPath },
}

impl Arg {
    pub fn lit(value: impl Into<String>) -> Self {
        Arg::Literal(value.into())
    }
}

/// Ordered stages of a deployment; strategies never go backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Phase {
    Prerequisites,
    Install,
    Build,
    Publish,
    Sync,
    PostSync,
    Marker,
}

/// Abort unless `program` is on `PATH` (and optionally reports `version_prefix`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolRequirement {
    pub program: String,
    pub display_name: String,
    pub version_prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandStep {
    pub phase: Phase,
    pub description: String,
    pub program: Program,
    pub args: Vec<Arg>,
    /// Directory to run in; the step restores the previous directory afterwards.
    pub working_dir: Option<ScriptPath>,
    /// Run only when this file exists.
    pub only_if_exists: Option<ScriptPath>,
}

impl CommandStep {
    pub fn new(phase: Phase, description: impl Into<String>, program: Program) -> Self {
        Self {
            phase,
            description: description.into(),
            program,
            args: Vec::new(),
            working_dir: None,
            only_if_exists: None,
        }
    }

    pub fn tool(phase: Phase, description: impl Into<String>, tool: &str) -> Self {
        Self::new(phase, description, Program::Tool(tool.to_string()))
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|a| Arg::Literal(a.into())));
        self
    }

    pub fn in_dir(mut self, dir: ScriptPath) -> Self {
        self.working_dir = Some(dir);
        self
    }

    pub fn only_if_exists(mut self, file: ScriptPath) -> Self {
        self.only_if_exists = Some(file);
        self
    }
}

/// KuduSync-equivalent copy of `source` into `DEPLOYMENT_TARGET`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStep {
    pub source: ScriptPath,
    pub exclude: Vec<String>,
}

/// Write `contents` to `path` when `when_exists` exists and `path` does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnsureFileStep {
    pub description: String,
    pub when_exists: ScriptPath,
    pub path: ScriptPath,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScriptStep {
    RequireTool(ToolRequirement),
    Run(CommandStep),
    Sync(SyncStep),
    EnsureFile(EnsureFileStep),
    DeploymentMarker(DeploymentMarker),
}

impl ScriptStep {
    pub fn phase(&self) -> Phase {
        match self {
            ScriptStep::RequireTool(_) => Phase::Prerequisites,
            ScriptStep::Run(step) => step.phase,
            ScriptStep::Sync(_) => Phase::Sync,
            ScriptStep::EnsureFile(_) => Phase::PostSync,
            ScriptStep::DeploymentMarker(_) => Phase::Marker,
        }
    }

    /// Script variables this step references.
    pub fn variables(&self) -> BTreeSet<ScriptVar> {
        let mut vars = BTreeSet::new();
        let mut add_path = |p: &ScriptPath| {
            vars.insert(p.base);
        };
        match self {
            ScriptStep::Run(step) => {
                if let Program::Var(var) = &step.program {
                    add_path(&ScriptPath::var(*var));
                }
                for arg in &step.args {
                    match arg {
                        Arg::Path(p) | Arg::Prefixed { path: p, .. } => add_path(p),
                        Arg::Literal(_) => {}
                    }
                }
                if let Some(dir) = &step.working_dir {
                    add_path(dir);
                }
                if let Some(file) = &step.only_if_exists {
                    add_path(file);
                }
            }
            ScriptStep::Sync(step) => add_path(&step.source),
            ScriptStep::EnsureFile(step) => {
                add_path(&step.when_exists);
                add_path(&step.path);
            }
            ScriptStep::RequireTool(_) | ScriptStep::DeploymentMarker(_) => {}
        }
        vars
    }
}

/// Default values baked into the script at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptVariables {
    pub repository_root: PathBuf,
    /// Site location relative to the repository root, when inside it.
    pub site_in_source: Option<Vec<String>>,
    pub site_path: PathBuf,
    pub output_path: PathBuf,
}

impl ScriptVariables {
    pub fn new(repository_root: &Path, site_path: &Path, output_path: &Path) -> Self {
        Self {
            repository_root: repository_root.to_path_buf(),
            site_in_source: site_path
                .strip_prefix(repository_root)
                .ok()
                .map(path_segments),
            site_path: site_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_path_under_root() {
        let path = ScriptPath::under(
            ScriptVar::DeploymentSource,
            Path::new("/repo"),
            Path::new("/repo/src/App/App.csproj"),
        )
        .unwrap();
        assert_eq!(path.relative, vec!["src", "App", "App.csproj"]);
        assert_eq!(path.parent().relative, vec!["src", "App"]);
    }

    #[test]
    fn script_path_outside_root_is_none() {
        assert!(
            ScriptPath::under(
                ScriptVar::DeploymentSource,
                Path::new("/repo"),
                Path::new("/elsewhere/app.csproj"),
            )
            .is_none()
        );
    }

    #[test]
    fn run_step_reports_referenced_variables() {
        let step = ScriptStep::Run(
            CommandStep::new(Phase::Build, "build", Program::Var(ScriptVar::MsBuildPath))
                .arg(Arg::Prefixed {
                    prefix: "/p:OutDir=".to_string(),
                    path: ScriptPath::var(ScriptVar::DeploymentTemp),
                })
                .in_dir(ScriptPath::var(ScriptVar::DeploymentSource)),
        );
        let vars: Vec<_> = step.variables().into_iter().collect();
        assert_eq!(
            vars,
            vec![
                ScriptVar::DeploymentSource,
                ScriptVar::DeploymentTemp,
                ScriptVar::MsBuildPath,
            ]
        );
    }

    #[test]
    fn site_inside_repository_is_relative() {
        let vars = ScriptVariables::new(
            Path::new("/repo"),
            Path::new("/repo/web"),
            Path::new("/repo"),
        );
        assert_eq!(vars.site_in_source, Some(vec!["web".to_string()]));

        let outside = ScriptVariables::new(
            Path::new("/repo"),
            Path::new("/srv/site"),
            Path::new("/repo"),
        );
        assert_eq!(outside.site_in_source, None);
    }
}
