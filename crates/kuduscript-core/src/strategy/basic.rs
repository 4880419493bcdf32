//! Sites deployed as-is: no install or build step.

use crate::error::GenerateError;
use crate::locator::ResolvedProject;
use crate::request::GenerationRequest;
use crate::script::ScriptStep;
use crate::types::ProjectType;

use super::{Strategy, sync_from};

#[derive(Debug)]
pub struct BasicStrategy;

impl Strategy for BasicStrategy {
    fn project_type(&self) -> ProjectType {
        ProjectType::Basic
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        Ok(vec![sync_from(project.site_dir(), request, &[])])
    }
}

/// Static website (plain ASP.NET web site, HTML).
#[derive(Debug)]
pub struct StaticSiteStrategy;

impl Strategy for StaticSiteStrategy {
    fn project_type(&self) -> ProjectType {
        ProjectType::StaticSite
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        Ok(vec![sync_from(project.site_dir(), request, &[])])
    }
}
