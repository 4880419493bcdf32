//! Per-project-type generation strategies.
//!
//! Each [`ProjectType`] has exactly one [`Strategy`], registered in
//! [`StrategyRegistry`]. A strategy is a pure function from the resolved
//! project and the request to an ordered list of script steps.

pub mod basic;
pub mod dotnet;
pub mod function_app;
pub mod go;
pub mod node;
pub mod php;
pub mod python;
pub mod ruby;

use crate::error::GenerateError;
use crate::locator::ResolvedProject;
use crate::request::GenerationRequest;
use crate::script::{ScriptPath, ScriptStep, SyncStep, ToolRequirement};
use crate::types::ProjectType;

/// Names excluded from every sync, besides the script itself.
const BASE_EXCLUDES: &[&str] = &[".git", ".hg", ".deployment"];

/// Build/install/sync steps for one project type.
pub trait Strategy: std::fmt::Debug + Send + Sync {
    fn project_type(&self) -> ProjectType;

    /// Ordered steps; phases never decrease.
    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError>;
}

/// Registry mapping each project type to its strategy.
#[derive(Debug)]
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_default_strategies()
    }
}

impl StrategyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Create a registry with a strategy for every project type.
    pub fn with_default_strategies() -> Self {
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(basic::BasicStrategy),
            Box::new(basic::StaticSiteStrategy),
            Box::new(node::NodeStrategy),
            Box::new(php::PhpStrategy),
            Box::new(python::PythonStrategy),
            Box::new(ruby::RubyStrategy),
            Box::new(go::GoStrategy),
            Box::new(dotnet::AspWapStrategy),
            Box::new(dotnet::AspNetCoreStrategy),
            Box::new(dotnet::DotNetConsoleStrategy),
            Box::new(function_app::FunctionAppStrategy),
        ];
        Self { strategies }
    }

    /// Register a strategy, replacing any previous one for the same type.
    pub fn register(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies
            .retain(|s| s.project_type() != strategy.project_type());
        self.strategies.push(strategy);
    }

    /// Strategy for `project_type`.
    pub fn select(&self, project_type: ProjectType) -> Result<&dyn Strategy, GenerateError> {
        self.strategies
            .iter()
            .find(|s| s.project_type() == project_type)
            .map(|s| s.as_ref())
            .ok_or(GenerateError::UnsupportedType(project_type))
    }

    /// Project types with a registered strategy.
    pub fn project_types(&self) -> Vec<ProjectType> {
        self.strategies.iter().map(|s| s.project_type()).collect()
    }
}

/// Exclusion list for a sync: VCS metadata, the marker, the script itself,
/// configured extras, then `caches` unless dependencies are included.
pub(crate) fn sync_excludes(request: &GenerationRequest, caches: &[&str]) -> Vec<String> {
    let mut exclude: Vec<String> = BASE_EXCLUDES.iter().map(|s| s.to_string()).collect();
    exclude.push(request.script_type().file_name().to_string());
    if !request.include_dependencies() {
        exclude.extend(caches.iter().map(|s| s.to_string()));
    }
    for extra in request.extra_excludes() {
        if !exclude.contains(extra) {
            exclude.push(extra.clone());
        }
    }
    exclude
}

pub(crate) fn sync_from(
    source: ScriptPath,
    request: &GenerationRequest,
    caches: &[&str],
) -> ScriptStep {
    ScriptStep::Sync(SyncStep {
        source,
        exclude: sync_excludes(request, caches),
    })
}

pub(crate) fn require_tool(program: &str, display_name: &str) -> ScriptStep {
    ScriptStep::RequireTool(ToolRequirement {
        program: program.to_string(),
        display_name: display_name.to_string(),
        version_prefix: None,
    })
}
