//! Azure Functions apps.
//!
//! With a project file the app is published with the dotnet CLI; without
//! one the function scripts are synced as-is after an optional npm install.
//! Either way an iisnode `web.config` is written when the deployed app has a
//! `server.js` and no config of its own.

use crate::error::GenerateError;
use crate::locator::ResolvedProject;
use crate::request::GenerationRequest;
use crate::script::{EnsureFileStep, ScriptPath, ScriptStep, ScriptVar};
use crate::types::ProjectType;

use super::dotnet::{dotnet_publish, require_dotnet};
use super::node::{NODE_CACHES, npm_install};
use super::{Strategy, sync_from};

pub(crate) const IISNODE_WEB_CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <system.webServer>
    <handlers>
      <add name="iisnode" path="server.js" verb="*" modules="iisnode"/>
    </handlers>
    <rewrite>
      <rules>
        <rule name="DynamicContent">
          <match url="/*" />
          <action type="Rewrite" url="server.js"/>
        </rule>
      </rules>
    </rewrite>
  </system.webServer>
</configuration>
"#;

#[derive(Debug)]
pub struct FunctionAppStrategy;

impl Strategy for FunctionAppStrategy {
    fn project_type(&self) -> ProjectType {
        ProjectType::FunctionApp
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        let mut steps = Vec::new();
        match project.project_file_in_source() {
            Some(project_file) => {
                steps.push(require_dotnet(request));
                steps.extend(dotnet_publish(project, project_file));
                steps.push(sync_from(
                    ScriptPath::var(ScriptVar::DeploymentTemp),
                    request,
                    &[],
                ));
            }
            None => {
                let site = project.site_dir();
                steps.push(npm_install(site.clone()));
                steps.push(sync_from(site, request, NODE_CACHES));
            }
        }

        let target = ScriptPath::var(ScriptVar::DeploymentTarget);
        steps.push(ScriptStep::EnsureFile(EnsureFileStep {
            description: "Add iisnode web.config".to_string(),
            when_exists: target.clone().join("server.js"),
            path: target.join("web.config"),
            contents: IISNODE_WEB_CONFIG.to_string(),
        }));
        Ok(steps)
    }
}
