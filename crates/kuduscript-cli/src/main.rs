//! Kuduscript - deployment script generator
//!
//! Usage:
//!   kuduscript --node                      # deploy.cmd for a node.js site
//!   kuduscript --asp-net-core -t bash      # deploy.sh for an ASP.NET Core app
//!   kuduscript --go --stdout               # print the script instead of writing it

mod prompt;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kuduscript_core::commands::{GenerateCommand, GenerationReport};
use kuduscript_core::config::{self, paths::default_global_dir};
use kuduscript_core::request::{
    GenerationRequest, InvocationOptions, ProjectTypeFlag, resolve_path,
};
use kuduscript_core::types::{ProjectType, ScriptType};

use crate::prompt::OverwritePrompt;

#[derive(Parser)]
#[command(name = "kuduscript", version)]
#[command(about = "Generate a deployment script for a repository", long_about = None)]
struct Cli {
    /// Repository root (default: current directory)
    #[arg(short = 'r', long = "repository-root", alias = "repositoryRoot", value_name = "DIR")]
    repository_root: Option<PathBuf>,

    /// Site directory, when it is not the repository root
    #[arg(short = 'p', long = "site-path", alias = "sitePath", value_name = "DIR")]
    site_path: Option<PathBuf>,

    /// Directory the script is written to (default: repository root)
    #[arg(short = 'o', long = "output-path", alias = "outputPath", value_name = "DIR")]
    output_path: Option<PathBuf>,

    /// Script flavor (default: batch, or the configured script_type)
    #[arg(short = 't', long = "script-type", alias = "scriptType", value_enum)]
    script_type: Option<ScriptTypeArg>,

    /// Solution file, relative to the current directory
    #[arg(short = 's', long = "solution-file", alias = "solutionFile", value_name = "FILE")]
    solution_file: Option<PathBuf>,

    /// Project file, for types that do not take one on their flag
    #[arg(long, value_name = "FILE")]
    project: Option<PathBuf>,

    #[command(flatten)]
    project_type: ProjectTypeArgs,

    /// Do not write the .deployment marker file
    #[arg(long = "no-dot-deployment")]
    no_dot_deployment: bool,

    /// Do not require or use a solution file
    #[arg(long = "no-solution")]
    no_solution: bool,

    /// Sync dependency caches (node_modules, vendor, ...) instead of excluding them
    #[arg(long = "include-dependencies")]
    include_dependencies: bool,

    /// Required .NET SDK version prefix
    #[arg(long = "dotnet-sdk", value_name = "VERSION")]
    dotnet_sdk: Option<String>,

    /// Overwrite existing files without asking
    #[arg(short = 'y', long = "suppress-prompt", alias = "suppressPrompt")]
    suppress_prompt: bool,

    /// Print the script to stdout instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    format: OutputFormat,
}

/// Exactly one of these selects the project type.
#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Project types")]
struct ProjectTypeArgs {
    /// Basic website
    #[arg(long)]
    basic: bool,

    /// Static website (plain ASP.NET web site, HTML)
    #[arg(long = "static-site", alias = "aspWebSite")]
    static_site: bool,

    /// node.js application
    #[arg(long)]
    node: bool,

    /// PHP website
    #[arg(long)]
    php: bool,

    /// Python website
    #[arg(long)]
    python: bool,

    /// Ruby website
    #[arg(long)]
    ruby: bool,

    /// Go module
    #[arg(long)]
    go: bool,

    /// ASP.NET web application project
    #[arg(long = "asp-wap", alias = "aspWAP", value_name = "PROJECT")]
    asp_wap: Option<PathBuf>,

    /// ASP.NET Core project (searched for when omitted)
    #[arg(long = "asp-net-core", alias = "aspNetCore", value_name = "PROJECT", num_args = 0..=1)]
    asp_net_core: Option<Option<PathBuf>>,

    /// .NET console application deployed as a WebJob
    #[arg(long = "dotnet-console", alias = "dotNetConsole", value_name = "PROJECT")]
    dotnet_console: Option<PathBuf>,

    /// Azure Functions app, optionally built from a .NET project
    #[arg(long = "function-app", alias = "functionApp", value_name = "PROJECT", num_args = 0..=1)]
    function_app: Option<Option<PathBuf>>,
}

impl ProjectTypeArgs {
    /// Every project-type flag present, in registry order.
    fn selected(&self) -> Vec<ProjectTypeFlag> {
        let with_project = [
            (self.asp_wap.as_ref().map(Some), ProjectType::AspWap),
            (self.asp_net_core.as_ref().map(Option::as_ref), ProjectType::AspNetCore),
            (self.dotnet_console.as_ref().map(Some), ProjectType::DotNetConsole),
            (self.function_app.as_ref().map(Option::as_ref), ProjectType::FunctionApp),
        ];
        let switches = [
            (self.static_site, ProjectType::StaticSite),
            (self.node, ProjectType::Node),
            (self.php, ProjectType::Php),
            (self.python, ProjectType::Python),
            (self.ruby, ProjectType::Ruby),
            (self.go, ProjectType::Go),
            (self.basic, ProjectType::Basic),
        ];

        let mut flags = Vec::new();
        for (value, project_type) in with_project {
            match value {
                Some(Some(path)) => {
                    flags.push(ProjectTypeFlag::with_project_file(project_type, path.clone()))
                }
                Some(None) => flags.push(ProjectTypeFlag::new(project_type)),
                None => {}
            }
        }
        flags.extend(
            switches
                .into_iter()
                .filter(|(on, _)| *on)
                .map(|(_, project_type)| ProjectTypeFlag::new(project_type)),
        );
        flags
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ScriptTypeArg {
    /// Windows batch (deploy.cmd)
    #[value(alias = "cmd")]
    Batch,
    /// POSIX shell (deploy.sh)
    #[value(alias = "sh")]
    Bash,
    /// PowerShell (deploy.ps1)
    #[value(alias = "powershell")]
    Posh,
}

impl From<ScriptTypeArg> for ScriptType {
    fn from(value: ScriptTypeArg) -> Self {
        match value {
            ScriptTypeArg::Batch => ScriptType::Batch,
            ScriptTypeArg::Bash => ScriptType::Bash,
            ScriptTypeArg::Posh => ScriptType::Posh,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

impl Cli {
    fn invocation_options(&self) -> InvocationOptions {
        InvocationOptions {
            repository_root: self.repository_root.clone(),
            site_path: self.site_path.clone(),
            output_path: self.output_path.clone(),
            script_type: self.script_type.map(ScriptType::from),
            solution_file: self.solution_file.clone(),
            project_file: self.project.clone(),
            project_types: self.project_type.selected(),
            no_dot_deployment: self.no_dot_deployment,
            no_solution: self.no_solution,
            include_dependencies: self.include_dependencies,
            dotnet_sdk: self.dotnet_sdk.clone(),
        }
    }
}

fn main() -> Result<ExitCode> {
    // Logs go to stderr so --stdout output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kuduscript=info,kuduscript_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let options = cli.invocation_options();
    // Reject a bad flag combination before reading anything from disk
    options.selected_project_type()?;

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let repository_root = resolve_path(
        &cwd,
        options.repository_root.as_deref().unwrap_or(Path::new(".")),
    );
    let config = config::load_effective(default_global_dir().as_deref(), &repository_root)?;
    let request = GenerationRequest::build(&options, &cwd, &config)?;
    let command = GenerateCommand::with_defaults();

    if cli.stdout {
        let plan = command.plan(&request)?;
        print!("{}", plan.document.as_str());
        return Ok(ExitCode::SUCCESS);
    }

    let mut prompt = OverwritePrompt::new(cli.suppress_prompt);
    let report = command.execute(&request, &mut prompt)?;

    match cli.format {
        OutputFormat::Table => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    // Printed on stderr in every output format
    if let Some(message) = cancellation_message(&report) {
        eprintln!("{} {}", style("✗").yellow(), message);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Notice for a declined overwrite, `None` when the script was written.
fn cancellation_message(report: &GenerationReport) -> Option<String> {
    report.is_cancelled().then(|| {
        format!(
            "Kept existing {}, generation cancelled",
            report.script_path.display()
        )
    })
}

fn print_report(report: &GenerationReport) {
    if report.is_cancelled() {
        return;
    }

    println!(
        "{} Generated {} script for {} ({})",
        style("✓").green(),
        report.script_type,
        style(report.project_type.display_name()).bold(),
        report.script
    );
    println!("  Script:    {}", report.script_path.display());
    if let Some(project) = &report.project_file {
        println!("  Project:   {}", project.display());
    }
    if let Some(solution) = &report.solution_file {
        println!("  Solution:  {}", solution.display());
    }
    if let (Some(path), Some(outcome)) = (&report.marker_path, report.marker) {
        println!("  Marker:    {} ({})", path.display(), outcome);
    }
}
