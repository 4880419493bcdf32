//! Go modules: download dependencies, build one binary, sync it.

use crate::error::GenerateError;
use crate::locator::ResolvedProject;
use crate::request::GenerationRequest;
use crate::script::{Arg, CommandStep, Phase, ScriptPath, ScriptStep, ScriptVar};
use crate::types::{ProjectType, ScriptType};

use super::{Strategy, require_tool, sync_from};

const FALLBACK_BINARY: &str = "app";

#[derive(Debug)]
pub struct GoStrategy;

impl Strategy for GoStrategy {
    fn project_type(&self) -> ProjectType {
        ProjectType::Go
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        let module_dir = project.require_project_file()?.parent();
        let temp = ScriptPath::var(ScriptVar::DeploymentTemp);
        let binary = binary_name(project, request.script_type());

        let download = CommandStep::tool(Phase::Install, "Download Go modules", "go")
            .args(["mod", "download"])
            .in_dir(module_dir.clone());
        let build = CommandStep::tool(Phase::Build, "Build the Go binary", "go")
            .args(["build", "-o"])
            .arg(Arg::Path(temp.clone().join(binary)))
            .arg(Arg::lit("."))
            .in_dir(module_dir);

        Ok(vec![
            require_tool("go", "Go"),
            ScriptStep::Run(download),
            ScriptStep::Run(build),
            sync_from(temp, request, &[]),
        ])
    }
}

/// Binary named after the module directory; Windows flavors get `.exe`.
fn binary_name(project: &ResolvedProject, script_type: ScriptType) -> String {
    let stem = project
        .project_file
        .as_deref()
        .and_then(|p| p.parent())
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_BINARY.to_string());
    match script_type {
        ScriptType::Bash => stem,
        ScriptType::Batch | ScriptType::Posh => format!("{stem}.exe"),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn project(go_mod: &str) -> ResolvedProject {
        ResolvedProject {
            project_type: ProjectType::Go,
            repository_root: PathBuf::from("/repo"),
            site_path: PathBuf::from("/repo"),
            project_file: Some(PathBuf::from(go_mod)),
            solution_file: None,
        }
    }

    #[test]
    fn binary_takes_module_directory_name() {
        let project = project("/repo/services/api/go.mod");
        assert_eq!(binary_name(&project, ScriptType::Bash), "api");
        assert_eq!(binary_name(&project, ScriptType::Batch), "api.exe");
        assert_eq!(binary_name(&project, ScriptType::Posh), "api.exe");
    }
}
