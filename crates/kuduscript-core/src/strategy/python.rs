//! Python: install `requirements.txt` with pip when present.

use crate::error::GenerateError;
use crate::locator::ResolvedProject;
use crate::request::GenerationRequest;
use crate::script::{CommandStep, Phase, ScriptStep};
use crate::types::ProjectType;

use super::{Strategy, require_tool, sync_from};

const PYTHON_CACHES: &[&str] = &["env", ".venv", "__pycache__"];

#[derive(Debug)]
pub struct PythonStrategy;

impl Strategy for PythonStrategy {
    fn project_type(&self) -> ProjectType {
        ProjectType::Python
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        let site = project.site_dir();
        let install = CommandStep::tool(Phase::Install, "Install Python packages", "python")
            .args(["-m", "pip", "install", "-r", "requirements.txt"])
            .only_if_exists(site.clone().join("requirements.txt"))
            .in_dir(site.clone());

        Ok(vec![
            require_tool("python", "Python"),
            ScriptStep::Run(install),
            sync_from(site, request, PYTHON_CACHES),
        ])
    }
}
