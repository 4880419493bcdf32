//! PHP: install Composer dependencies when `composer.json` is present.

use crate::error::GenerateError;
use crate::locator::ResolvedProject;
use crate::request::GenerationRequest;
use crate::script::{CommandStep, Phase, ScriptStep};
use crate::types::ProjectType;

use super::{Strategy, sync_from};

const PHP_CACHES: &[&str] = &["vendor"];

#[derive(Debug)]
pub struct PhpStrategy;

impl Strategy for PhpStrategy {
    fn project_type(&self) -> ProjectType {
        ProjectType::Php
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        let site = project.site_dir();
        let install = CommandStep::tool(Phase::Install, "Install Composer dependencies", "composer")
            .args(["install", "--no-dev", "--prefer-dist", "--optimize-autoloader"])
            .only_if_exists(site.clone().join("composer.json"))
            .in_dir(site.clone());

        Ok(vec![
            ScriptStep::Run(install),
            sync_from(site, request, PHP_CACHES),
        ])
    }
}
