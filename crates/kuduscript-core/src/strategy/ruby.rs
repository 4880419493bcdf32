//! Ruby: install gems with Bundler when a `Gemfile` is present.

use crate::error::GenerateError;
use crate::locator::ResolvedProject;
use crate::request::GenerationRequest;
use crate::script::{CommandStep, Phase, ScriptStep};
use crate::types::ProjectType;

use super::{Strategy, require_tool, sync_from};

const RUBY_CACHES: &[&str] = &[".bundle", "vendor/bundle"];

#[derive(Debug)]
pub struct RubyStrategy;

impl Strategy for RubyStrategy {
    fn project_type(&self) -> ProjectType {
        ProjectType::Ruby
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        let site = project.site_dir();
        let install = CommandStep::tool(Phase::Install, "Install gems", "bundle")
            .args(["install", "--deployment", "--without", "development", "test"])
            .only_if_exists(site.clone().join("Gemfile"))
            .in_dir(site.clone());

        Ok(vec![
            require_tool("bundle", "Bundler"),
            ScriptStep::Run(install),
            sync_from(site, request, RUBY_CACHES),
        ])
    }
}
