//! Integration tests for the generate command

use std::fs;
use std::io;
use std::path::Path;

use filetime::FileTime;
use tempfile::TempDir;

use kuduscript_core::commands::GenerateCommand;
use kuduscript_core::config::GeneratorConfig;
use kuduscript_core::error::GenerateError;
use kuduscript_core::locator::ResolvedProject;
use kuduscript_core::output::{AlwaysConfirm, WriteOutcome};
use kuduscript_core::request::{GenerationRequest, InvocationOptions, ProjectTypeFlag};
use kuduscript_core::script::{CommandStep, Phase, ScriptStep, SyncStep};
use kuduscript_core::strategy::{Strategy, StrategyRegistry};
use kuduscript_core::types::{ProjectType, ScriptType};

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

fn options(project_type: ProjectType, script_type: ScriptType) -> InvocationOptions {
    InvocationOptions::new()
        .with_project_type(ProjectTypeFlag::new(project_type))
        .with_script_type(script_type)
}

fn build(root: &Path, options: InvocationOptions) -> GenerationRequest {
    build_with_config(root, options, &GeneratorConfig::new())
}

fn build_with_config(
    root: &Path,
    options: InvocationOptions,
    config: &GeneratorConfig,
) -> GenerationRequest {
    let options = options.with_repository_root(root);
    GenerationRequest::build(&options, root, config).unwrap()
}

/// Repository that satisfies every project type's file lookup.
fn polyglot_repo() -> TempDir {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "App.sln");
    touch(temp.path(), "src/App/App.csproj");
    touch(temp.path(), "go.mod");
    touch(temp.path(), "package.json");
    temp
}

#[test]
fn basic_batch_writes_script_and_marker() {
    let temp = TempDir::new().unwrap();
    let request = build(temp.path(), options(ProjectType::Basic, ScriptType::Batch));

    let report = GenerateCommand::with_defaults()
        .execute(&request, &mut AlwaysConfirm)
        .expect("generation should succeed");

    assert_eq!(report.script, WriteOutcome::Created);
    assert_eq!(report.marker, Some(WriteOutcome::Created));
    assert!(!report.is_cancelled());

    let script = fs::read_to_string(temp.path().join("deploy.cmd")).unwrap();
    assert!(script.starts_with("@if \"%SCM_TRACE_LEVEL%\" NEQ \"4\" @echo off\r\n"));
    assert!(script.contains("-i \".git;.hg;.deployment;deploy.cmd\""));
    assert!(script.contains("echo Finished successfully."));

    let marker = fs::read_to_string(temp.path().join(".deployment")).unwrap();
    assert_eq!(marker, "[config]\ncommand = deploy.cmd\nscript_type = batch\n");
}

#[test]
fn batch_scripts_use_crlf_line_endings() {
    let temp = TempDir::new().unwrap();
    let request = build(temp.path(), options(ProjectType::Basic, ScriptType::Batch));

    let plan = GenerateCommand::with_defaults().plan(&request).unwrap();
    let text = plan.document.as_str();

    assert!(text.ends_with("\r\n"));
    assert!(
        text.match_indices('\n')
            .all(|(i, _)| i > 0 && text.as_bytes()[i - 1] == b'\r')
    );
}

#[test]
fn node_bash_installs_then_syncs_without_node_modules() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "package.json");
    let request = build(temp.path(), options(ProjectType::Node, ScriptType::Bash));

    let plan = GenerateCommand::with_defaults().plan(&request).unwrap();
    let text = plan.document.as_str();

    assert!(text.starts_with("#!/bin/bash\n"));
    let install = text.find("npm install --production").unwrap();
    let sync = text.find("\"$KUDU_SYNC_CMD\"").unwrap();
    assert!(install < sync);
    assert!(text.contains("-i \".git;.hg;.deployment;deploy.sh;node_modules\""));
    assert!(text.contains("hash node 2>/dev/null || failDeployment"));
}

#[test]
fn include_dependencies_keeps_caches_in_sync() {
    let temp = TempDir::new().unwrap();
    let request = build(
        temp.path(),
        options(ProjectType::Node, ScriptType::Bash).with_include_dependencies(true),
    );

    let plan = GenerateCommand::with_defaults().plan(&request).unwrap();

    assert!(
        plan.document
            .as_str()
            .contains("-i \".git;.hg;.deployment;deploy.sh\"")
    );
}

#[test]
fn config_excludes_are_appended() {
    let temp = TempDir::new().unwrap();
    let config = GeneratorConfig {
        exclude: vec!["docs".to_string()],
        ..GeneratorConfig::default()
    };
    let request = build_with_config(
        temp.path(),
        options(ProjectType::Basic, ScriptType::Bash),
        &config,
    );

    let plan = GenerateCommand::with_defaults().plan(&request).unwrap();

    assert!(
        plan.document
            .as_str()
            .contains("-i \".git;.hg;.deployment;deploy.sh;docs\"")
    );
}

#[test]
fn asp_wap_batch_builds_into_temp_and_syncs_from_it() {
    let temp = polyglot_repo();
    let request = build(temp.path(), options(ProjectType::AspWap, ScriptType::Batch));

    let plan = GenerateCommand::with_defaults().plan(&request).unwrap();
    let text = plan.document.as_str();

    assert!(text.contains("nuget restore \"%DEPLOYMENT_SOURCE%\\App.sln\""));
    assert!(text.contains("\"%MSBUILD_PATH%\" \"%DEPLOYMENT_SOURCE%\\src\\App\\App.csproj\""));
    assert!(text.contains("/p:_PackageTempDir=\"%DEPLOYMENT_TEMP%\""));
    assert!(text.contains("-f \"%DEPLOYMENT_TEMP%\""));
    assert!(text.contains("SET CLEAN_LOCAL_DEPLOYMENT_TEMP=true"));
}

#[test]
fn dotnet_sdk_pin_is_checked() {
    let temp = polyglot_repo();
    let request = build(
        temp.path(),
        options(ProjectType::AspNetCore, ScriptType::Bash).with_dotnet_sdk("8.0"),
    );

    let plan = GenerateCommand::with_defaults().plan(&request).unwrap();
    let text = plan.document.as_str();

    assert!(text.contains("if [[ \"$(dotnet --version)\" != \"8.0\"* ]]; then"));
    assert!(text.contains("dotnet publish \"$DEPLOYMENT_SOURCE/src/App/App.csproj\""));
}

#[test]
fn function_app_without_project_adds_iisnode_config() {
    let temp = TempDir::new().unwrap();
    let request = build(temp.path(), options(ProjectType::FunctionApp, ScriptType::Posh));

    let plan = GenerateCommand::with_defaults().plan(&request).unwrap();

    assert!(matches!(
        plan.steps.iter().rev().nth(1),
        Some(ScriptStep::EnsureFile(_))
    ));
    let text = plan.document.as_str();
    assert!(text.contains("npm install --production"));
    assert!(text.contains("web.config"));
    assert!(text.contains("modules=\"iisnode\""));
}

#[test]
fn every_project_type_emits_ordered_steps_ending_with_marker() {
    let temp = polyglot_repo();
    let command = GenerateCommand::with_defaults();

    for project_type in ProjectType::ALL {
        let request = build(temp.path(), options(project_type, ScriptType::Bash));
        let plan = command
            .plan(&request)
            .unwrap_or_else(|e| panic!("{project_type}: {e}"));

        assert!(
            plan.steps
                .windows(2)
                .all(|w| w[0].phase() <= w[1].phase()),
            "{project_type} steps out of order"
        );
        assert_eq!(plan.steps.last().map(|s| s.phase()), Some(Phase::Marker));
        assert!(
            plan.steps.iter().any(|s| matches!(s, ScriptStep::Sync(_))),
            "{project_type} never syncs"
        );
    }
}

#[test]
fn rendering_is_deterministic() {
    let temp = polyglot_repo();
    let command = GenerateCommand::with_defaults();

    for script_type in [ScriptType::Batch, ScriptType::Bash, ScriptType::Posh] {
        let request = build(temp.path(), options(ProjectType::AspNetCore, script_type));
        let first = command.plan(&request).unwrap().document;
        let second = command.plan(&request).unwrap().document;
        assert_eq!(first, second);
    }
}

#[test]
fn no_dot_deployment_skips_marker() {
    let temp = TempDir::new().unwrap();
    let request = build(
        temp.path(),
        options(ProjectType::Php, ScriptType::Bash).with_no_dot_deployment(true),
    );

    let report = GenerateCommand::with_defaults()
        .execute(&request, &mut AlwaysConfirm)
        .unwrap();

    assert_eq!(report.marker, None);
    assert!(report.marker_path.is_none());
    assert!(temp.path().join("deploy.sh").exists());
    assert!(!temp.path().join(".deployment").exists());
}

#[test]
fn declined_overwrite_leaves_files_untouched() {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("deploy.cmd");
    fs::write(&script, "old script").unwrap();
    let past = FileTime::from_unix_time(1_000_000_000, 0);
    filetime::set_file_mtime(&script, past).unwrap();

    let request = build(temp.path(), options(ProjectType::Basic, ScriptType::Batch));
    let mut prompts = Vec::new();
    let mut decline = |message: &str| -> io::Result<bool> {
        prompts.push(message.to_string());
        Ok(false)
    };

    let report = GenerateCommand::with_defaults()
        .execute(&request, &mut decline)
        .unwrap();

    assert!(report.is_cancelled());
    assert_eq!(report.marker, None);
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("deploy.cmd"));
    assert_eq!(fs::read_to_string(&script).unwrap(), "old script");
    let mtime = FileTime::from_last_modification_time(&fs::metadata(&script).unwrap());
    assert_eq!(mtime, past);
    assert!(!temp.path().join(".deployment").exists());
}

#[test]
fn accepted_overwrite_replaces_script() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("deploy.sh"), "old").unwrap();
    let request = build(temp.path(), options(ProjectType::Basic, ScriptType::Bash));

    let report = GenerateCommand::with_defaults()
        .execute(&request, &mut AlwaysConfirm)
        .unwrap();

    assert_eq!(report.script, WriteOutcome::Overwritten);
    let script = fs::read_to_string(temp.path().join("deploy.sh")).unwrap();
    assert!(script.starts_with("#!/bin/bash"));
    let marker = fs::read_to_string(temp.path().join(".deployment")).unwrap();
    assert_eq!(marker, "[config]\ncommand = bash deploy.sh\nscript_type = bash\n");
}

#[test]
fn output_directory_is_created() {
    let temp = TempDir::new().unwrap();
    let request = build(
        temp.path(),
        options(ProjectType::Basic, ScriptType::Posh)
            .with_output_path(temp.path().join("build/scripts")),
    );

    let report = GenerateCommand::with_defaults()
        .execute(&request, &mut AlwaysConfirm)
        .unwrap();

    assert!(temp.path().join("build/scripts/deploy.ps1").exists());
    let marker = fs::read_to_string(temp.path().join(".deployment")).unwrap();
    assert!(marker.contains("-File build\\scripts\\deploy.ps1"));
    assert_eq!(report.script_type, ScriptType::Posh);
}

#[test]
fn locator_errors_surface_before_writing() {
    let temp = TempDir::new().unwrap();
    let request = build(temp.path(), options(ProjectType::Go, ScriptType::Bash));

    let err = GenerateCommand::with_defaults()
        .execute(&request, &mut AlwaysConfirm)
        .unwrap_err();

    assert!(matches!(err, GenerateError::Locator(_)));
    assert!(!temp.path().join("deploy.sh").exists());
}

#[test]
fn explicit_web_app_without_solution_skips_solution_search() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "First.sln");
    touch(temp.path(), "Second.sln");
    touch(temp.path(), "Web/Web.csproj");
    let options = InvocationOptions::new()
        .with_project_type(ProjectTypeFlag::with_project_file(
            ProjectType::AspWap,
            temp.path().join("Web/Web.csproj"),
        ))
        .with_script_type(ScriptType::Batch)
        .with_no_solution(true);
    let request = build(temp.path(), options);

    let plan = GenerateCommand::with_defaults()
        .plan(&request)
        .expect("two solutions must not matter without a solution search");

    assert_eq!(plan.resolved.solution_file, None);
    let phases: Vec<Phase> = plan.steps.iter().map(|s| s.phase()).collect();
    assert_eq!(
        phases,
        vec![
            Phase::Install,
            Phase::Build,
            Phase::Publish,
            Phase::Sync,
            Phase::Marker
        ]
    );
    let text = plan.document.as_str();
    assert!(!text.contains("nuget restore"));
    assert!(text.contains("/t:Restore"));
}

/// Emits a sync before an install step.
#[derive(Debug)]
struct SyncBeforeInstall;

impl Strategy for SyncBeforeInstall {
    fn project_type(&self) -> ProjectType {
        ProjectType::Basic
    }

    fn steps(
        &self,
        project: &ResolvedProject,
        _request: &GenerationRequest,
    ) -> Result<Vec<ScriptStep>, GenerateError> {
        Ok(vec![
            ScriptStep::Sync(SyncStep {
                source: project.site_dir(),
                exclude: Vec::new(),
            }),
            ScriptStep::Run(CommandStep::tool(Phase::Install, "Late install", "npm")),
        ])
    }
}

#[test]
fn out_of_order_strategy_is_rejected() {
    let temp = TempDir::new().unwrap();
    let mut registry = StrategyRegistry::with_default_strategies();
    registry.register(Box::new(SyncBeforeInstall));
    let request = build(temp.path(), options(ProjectType::Basic, ScriptType::Bash));

    let err = GenerateCommand::new(registry).plan(&request).unwrap_err();

    assert!(matches!(
        err,
        GenerateError::StepOrder {
            project_type: ProjectType::Basic,
            before: Phase::Sync,
            after: Phase::Install,
        }
    ));
    assert!(!temp.path().join("deploy.sh").exists());
}

#[test]
fn batch_setup_escapes_exclamation_in_repository_path() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("wow!repo");
    fs::create_dir_all(&root).unwrap();
    let request = build(&root, options(ProjectType::Basic, ScriptType::Batch));

    let plan = GenerateCommand::with_defaults().plan(&request).unwrap();

    let text = plan.document.as_str();
    assert!(text.contains("setlocal enabledelayedexpansion"));
    assert!(text.contains("wow^!repo"));
    assert!(!text.contains("wow!repo"));
}
