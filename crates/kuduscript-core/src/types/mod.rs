//! Shared core types: the project-type registry and script flavors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target syntax of the generated deployment script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    /// Windows batch (`deploy.cmd`).
    #[default]
    Batch,
    /// POSIX shell (`deploy.sh`).
    Bash,
    /// PowerShell (`deploy.ps1`).
    Posh,
}

impl ScriptType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptType::Batch => "batch",
            ScriptType::Bash => "bash",
            ScriptType::Posh => "posh",
        }
    }

    /// File name of the generated script.
    pub fn file_name(self) -> &'static str {
        match self {
            ScriptType::Batch => "deploy.cmd",
            ScriptType::Bash => "deploy.sh",
            ScriptType::Posh => "deploy.ps1",
        }
    }

    /// Whether the script addresses paths with `\` separators.
    pub fn uses_backslash(self) -> bool {
        !matches!(self, ScriptType::Bash)
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed classification of a repository's technology stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    /// Any other website: copy the site as-is.
    Basic,
    /// Static website (plain ASP.NET web site or HTML).
    StaticSite,
    Node,
    Php,
    Python,
    Ruby,
    Go,
    /// .NET Framework web application project.
    AspWap,
    /// ASP.NET Core web application, optionally pinned to an SDK version.
    AspNetCore,
    /// .NET console application deployed as a continuous web job.
    DotNetConsole,
    /// Azure Function App (script based, or compiled when a project is given).
    FunctionApp,
}

/// What a project type needs from the locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectRequirements {
    /// A single project file must be found or supplied.
    pub project_file: bool,
    /// A single solution file must be found or supplied (unless disabled).
    pub solution_file: bool,
    /// File name patterns that identify the project file.
    pub project_patterns: &'static [&'static str],
}

const NO_PATTERNS: &[&str] = &[];
const MSBUILD_PROJECT_PATTERNS: &[&str] = &["*.csproj", "*.vbproj"];
const DOTNET_CORE_PROJECT_PATTERNS: &[&str] = &["*.csproj", "*.fsproj"];
const GO_PROJECT_PATTERNS: &[&str] = &["go.mod"];

/// Patterns identifying a solution file.
pub const SOLUTION_PATTERNS: &[&str] = &["*.sln"];

impl ProjectType {
    /// Every registered project type, in flag order.
    pub const ALL: [ProjectType; 11] = [
        ProjectType::AspWap,
        ProjectType::AspNetCore,
        ProjectType::DotNetConsole,
        ProjectType::FunctionApp,
        ProjectType::StaticSite,
        ProjectType::Node,
        ProjectType::Php,
        ProjectType::Python,
        ProjectType::Ruby,
        ProjectType::Go,
        ProjectType::Basic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectType::Basic => "basic",
            ProjectType::StaticSite => "static-site",
            ProjectType::Node => "node",
            ProjectType::Php => "php",
            ProjectType::Python => "python",
            ProjectType::Ruby => "ruby",
            ProjectType::Go => "go",
            ProjectType::AspWap => "asp-wap",
            ProjectType::AspNetCore => "asp-net-core",
            ProjectType::DotNetConsole => "dotnet-console",
            ProjectType::FunctionApp => "function-app",
        }
    }

    /// Command-line flag selecting this type.
    pub fn flag(self) -> String {
        format!("--{}", self.as_str())
    }

    /// Human readable label used in script banners.
    pub fn display_name(self) -> &'static str {
        match self {
            ProjectType::Basic => "basic website",
            ProjectType::StaticSite => "static website",
            ProjectType::Node => "node.js",
            ProjectType::Php => "PHP",
            ProjectType::Python => "Python",
            ProjectType::Ruby => "Ruby",
            ProjectType::Go => "Go",
            ProjectType::AspWap => ".NET web application",
            ProjectType::AspNetCore => "ASP.NET Core",
            ProjectType::DotNetConsole => ".NET console application",
            ProjectType::FunctionApp => "Function App",
        }
    }

    pub fn requirements(self) -> ProjectRequirements {
        match self {
            ProjectType::AspWap | ProjectType::DotNetConsole => ProjectRequirements {
                project_file: true,
                solution_file: true,
                project_patterns: MSBUILD_PROJECT_PATTERNS,
            },
            ProjectType::AspNetCore => ProjectRequirements {
                project_file: true,
                solution_file: false,
                project_patterns: DOTNET_CORE_PROJECT_PATTERNS,
            },
            ProjectType::Go => ProjectRequirements {
                project_file: true,
                solution_file: false,
                project_patterns: GO_PROJECT_PATTERNS,
            },
            ProjectType::FunctionApp
            | ProjectType::Basic
            | ProjectType::StaticSite
            | ProjectType::Node
            | ProjectType::Php
            | ProjectType::Python
            | ProjectType::Ruby => ProjectRequirements {
                project_file: false,
                solution_file: false,
                project_patterns: NO_PATTERNS,
            },
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
