//! node.js: install packages with npm, then sync without `node_modules`.

use crate::error::GenerateError;
use crate::locator::ResolvedProject;
use crate::request::GenerationRequest;
use crate::script::{CommandStep, Phase, ScriptPath, ScriptStep};
use crate::types::ProjectType;

use super::{Strategy, require_tool, sync_from};

pub(crate) const NODE_CACHES: &[&str] = &["node_modules"];

#[derive(Debug)]
pub struct NodeStrategy;

impl Strategy for NodeStrategy {
    fn project_type(&self) -> ProjectType {
        ProjectType::Node
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        let site = project.site_dir();
        Ok(vec![
            require_tool("node", "node.js"),
            npm_install(site.clone()),
            sync_from(site, request, NODE_CACHES),
        ])
    }
}

/// `npm install --production` in `dir`, when it has a `package.json`.
pub(crate) fn npm_install(dir: ScriptPath) -> ScriptStep {
    ScriptStep::Run(
        CommandStep::tool(Phase::Install, "Install npm packages", "npm")
            .args(["install", "--production"])
            .only_if_exists(dir.clone().join("package.json"))
            .in_dir(dir),
    )
}
