//! .NET project types built with MSBuild or the dotnet CLI.
//!
//! All three compile into `DEPLOYMENT_TEMP` and sync from there, so the
//! repository itself is never copied to the target.

use crate::error::GenerateError;
use crate::locator::ResolvedProject;
use crate::request::GenerationRequest;
use crate::script::{
    Arg, CommandStep, Phase, Program, ScriptPath, ScriptStep, ScriptVar, ToolRequirement,
};
use crate::types::ProjectType;

use super::{Strategy, sync_from};

/// ASP.NET web application project (`.csproj`/`.vbproj` with a solution).
#[derive(Debug)]
pub struct AspWapStrategy;

impl Strategy for AspWapStrategy {
    fn project_type(&self) -> ProjectType {
        ProjectType::AspWap
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        let project_file = project.require_project_file()?;
        let temp = ScriptPath::var(ScriptVar::DeploymentTemp);

        let build = msbuild(Phase::Build, "Build the web application", project_file.clone())
            .args([
                "/t:Build",
                "/p:Configuration=Release",
                "/p:UseSharedCompilation=false",
            ]);
        let publish = msbuild(
            Phase::Publish,
            "Package to the temporary path",
            project_file.clone(),
        )
        .args([
            "/t:pipelinePreDeployCopyAllFilesToOneFolder",
            "/p:Configuration=Release",
            "/p:AutoParameterizationWebConfigConnectionStrings=false",
        ])
        .arg(Arg::Prefixed {
            prefix: "/p:_PackageTempDir=".to_string(),
            path: temp.clone(),
        });

        Ok(vec![
            nuget_restore(project, project_file),
            ScriptStep::Run(build),
            ScriptStep::Run(publish),
            sync_from(temp, request, &[]),
        ])
    }
}

/// ASP.NET Core project built with the dotnet CLI.
#[derive(Debug)]
pub struct AspNetCoreStrategy;

impl Strategy for AspNetCoreStrategy {
    fn project_type(&self) -> ProjectType {
        ProjectType::AspNetCore
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        let project_file = project.require_project_file()?;
        let mut steps = vec![require_dotnet(request)];
        steps.extend(dotnet_publish(project, project_file));
        steps.push(sync_from(
            ScriptPath::var(ScriptVar::DeploymentTemp),
            request,
            &[],
        ));
        Ok(steps)
    }
}

/// .NET console application deployed as a continuous WebJob.
#[derive(Debug)]
pub struct DotNetConsoleStrategy;

/// Where WebJobs look for a continuously running job.
const WEBJOB_DIR: &[&str] = &["app_data", "jobs", "continuous", "deployedJob"];

impl Strategy for DotNetConsoleStrategy {
    fn project_type(&self) -> ProjectType {
        ProjectType::DotNetConsole
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        let project_file = project.require_project_file()?;
        let temp = ScriptPath::var(ScriptVar::DeploymentTemp);
        let job_dir = WEBJOB_DIR
            .iter()
            .fold(temp.clone(), |path, segment| path.join(*segment));

        let build = msbuild(Phase::Build, "Build to the WebJob path", project_file.clone())
            .args(["/t:Build", "/p:Configuration=Release"])
            .arg(Arg::Prefixed {
                prefix: "/p:OutputPath=".to_string(),
                path: job_dir,
            });

        Ok(vec![
            nuget_restore(project, project_file),
            ScriptStep::Run(build),
            sync_from(temp, request, &[]),
        ])
    }
}

fn msbuild(phase: Phase, description: &str, project_file: ScriptPath) -> CommandStep {
    CommandStep::new(phase, description, Program::Var(ScriptVar::MsBuildPath))
        .arg(Arg::Path(project_file))
        .args(["/nologo", "/verbosity:m"])
}

/// `nuget restore` on the solution, or an MSBuild restore of the project.
fn nuget_restore(project: &ResolvedProject, project_file: ScriptPath) -> ScriptStep {
    let step = match project.solution_file_in_source() {
        Some(solution) => CommandStep::tool(Phase::Install, "Restore NuGet packages", "nuget")
            .arg(Arg::lit("restore"))
            .arg(Arg::Path(solution)),
        None => msbuild(Phase::Install, "Restore NuGet packages", project_file)
            .arg(Arg::lit("/t:Restore")),
    };
    ScriptStep::Run(step)
}

/// Require `dotnet`, pinned to the configured SDK version when set.
pub(crate) fn require_dotnet(request: &GenerationRequest) -> ScriptStep {
    ScriptStep::RequireTool(ToolRequirement {
        program: "dotnet".to_string(),
        display_name: ".NET SDK".to_string(),
        version_prefix: request.dotnet_sdk().map(str::to_string),
    })
}

/// Restore, build and publish `project_file` into `DEPLOYMENT_TEMP`.
pub(crate) fn dotnet_publish(
    project: &ResolvedProject,
    project_file: ScriptPath,
) -> Vec<ScriptStep> {
    let restore_target = project
        .solution_file_in_source()
        .unwrap_or_else(|| project_file.clone());

    let restore = CommandStep::tool(Phase::Install, "Restore NuGet packages", "dotnet")
        .arg(Arg::lit("restore"))
        .arg(Arg::Path(restore_target));
    let build = CommandStep::tool(Phase::Build, "Build the project", "dotnet")
        .arg(Arg::lit("build"))
        .arg(Arg::Path(project_file.clone()))
        .args(["--configuration", "Release", "--no-restore"]);
    let publish = CommandStep::tool(Phase::Publish, "Publish to the temporary path", "dotnet")
        .arg(Arg::lit("publish"))
        .arg(Arg::Path(project_file))
        .args(["--configuration", "Release", "--no-build", "--output"])
        .arg(Arg::Path(ScriptPath::var(ScriptVar::DeploymentTemp)));

    vec![
        ScriptStep::Run(restore),
        ScriptStep::Run(build),
        ScriptStep::Run(publish),
    ]
}
