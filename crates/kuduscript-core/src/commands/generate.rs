//! Generate command implementation.
//!
//! Locates the project files, asks the type's strategy for steps, renders
//! them, then writes the script followed by the `.deployment` marker.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::GenerateError;
use crate::locator::{self, ResolvedProject};
use crate::output::{self, ConfirmOverwrite, WriteOutcome};
use crate::request::GenerationRequest;
use crate::script::{
    DeploymentMarker, RenderContext, ScriptDocument, ScriptStep, ScriptVariables, render,
};
use crate::strategy::StrategyRegistry;
use crate::types::{ProjectType, ScriptType};

/// Everything a request would produce, before touching the filesystem.
#[derive(Debug, Clone)]
pub struct GenerationPlan {
    pub resolved: ResolvedProject,
    pub steps: Vec<ScriptStep>,
    pub document: ScriptDocument,
    pub script_path: PathBuf,
    /// `None` when the marker is disabled.
    pub marker: Option<DeploymentMarker>,
}

/// Result of a generate run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub project_type: ProjectType,
    pub script_type: ScriptType,
    pub script_path: PathBuf,
    pub script: WriteOutcome,
    pub marker_path: Option<PathBuf>,
    /// `None` when the marker is disabled or was skipped after the script
    /// was declined.
    pub marker: Option<WriteOutcome>,
    pub project_file: Option<PathBuf>,
    pub solution_file: Option<PathBuf>,
}

impl GenerationReport {
    /// Whether the user declined to overwrite the script.
    pub fn is_cancelled(&self) -> bool {
        self.script == WriteOutcome::Declined
    }
}

/// Generate command orchestrator
#[derive(Debug, Default)]
pub struct GenerateCommand {
    registry: StrategyRegistry,
}

impl GenerateCommand {
    pub fn new(registry: StrategyRegistry) -> Self {
        Self { registry }
    }

    /// Command backed by the built-in strategies.
    pub fn with_defaults() -> Self {
        Self::new(StrategyRegistry::with_default_strategies())
    }

    /// Resolve, dispatch and render without writing anything.
    pub fn plan(&self, request: &GenerationRequest) -> Result<GenerationPlan, GenerateError> {
        let project_type = request.project_type();
        let script_type = request.script_type();
        let resolved = locator::locate(request)?;
        let strategy = self.registry.select(project_type)?;

        let mut steps = strategy.steps(&resolved, request)?;
        let script_path = request.script_path();
        let marker = (!request.no_dot_deployment()).then(|| {
            DeploymentMarker::for_script(request.repository_root(), &script_path, script_type)
        });
        if let Some(marker) = &marker {
            steps.push(ScriptStep::DeploymentMarker(marker.clone()));
        }
        if let Some(pair) = steps.windows(2).find(|w| w[0].phase() > w[1].phase()) {
            return Err(GenerateError::StepOrder {
                project_type,
                before: pair[0].phase(),
                after: pair[1].phase(),
            });
        }

        let context = RenderContext {
            title: project_type.display_name().to_string(),
            variables: ScriptVariables::new(
                request.repository_root(),
                request.site_path(),
                request.output_path(),
            ),
        };
        let document = render(&context, &steps, script_type);
        tracing::debug!(
            %project_type,
            script_type = %document.script_type(),
            steps = steps.len(),
            bytes = document.as_str().len(),
            "rendered deployment script"
        );

        Ok(GenerationPlan {
            resolved,
            steps,
            document,
            script_path,
            marker,
        })
    }

    /// Generate and write the script, then the marker.
    ///
    /// When the script overwrite is declined the marker is not written and
    /// the report is marked cancelled.
    pub fn execute(
        &self,
        request: &GenerationRequest,
        confirm: &mut dyn ConfirmOverwrite,
    ) -> Result<GenerationReport, GenerateError> {
        let plan = self.plan(request)?;

        let script = output::write(&plan.script_path, plan.document.as_str(), confirm)?;
        tracing::info!(
            path = %plan.script_path.display(),
            outcome = %script,
            "deployment script"
        );

        let marker_path = plan
            .marker
            .as_ref()
            .map(|_| request.repository_root().join(DeploymentMarker::FILE_NAME));
        let marker = match (&plan.marker, &marker_path) {
            (Some(marker), Some(path)) if script.is_written() => {
                let outcome = output::write(path, &marker.to_ini(), confirm)?;
                tracing::info!(path = %path.display(), outcome = %outcome, "deployment marker");
                Some(outcome)
            }
            (Some(_), Some(_)) => {
                tracing::info!("script not written, skipping deployment marker");
                None
            }
            _ => None,
        };

        Ok(GenerationReport {
            project_type: request.project_type(),
            script_type: request.script_type(),
            script_path: plan.script_path,
            script,
            marker_path,
            marker,
            project_file: plan.resolved.project_file,
            solution_file: plan.resolved.solution_file,
        })
    }
}
