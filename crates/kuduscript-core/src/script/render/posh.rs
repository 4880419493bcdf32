//! PowerShell (`deploy.ps1`) dialect.
//!
//! Variables live in `$env:` so overrides from the hosting platform and the
//! defaults assigned here share one namespace.

use std::collections::BTreeSet;

use crate::script::{
    Arg, CommandStep, DeploymentMarker, EnsureFileStep, Program, ScriptPath, ScriptVar,
    ScriptVariables, SyncStep, ToolRequirement,
};

use super::{Dialect, GENERATOR_VERSION, LineWriter, failure_message, is_plain};

const BANNER: &str = "##################################################################################################################################";

pub(super) struct PoshDialect;

impl PoshDialect {
    fn path(&self, path: &ScriptPath) -> String {
        format!("\"{}\"", unquoted_path(path))
    }

    fn arg(&self, arg: &Arg) -> String {
        match arg {
            Arg::Literal(value) if is_plain(value) => value.clone(),
            Arg::Literal(value) => quote(value),
            Arg::Path(path) => self.path(path),
            Arg::Prefixed { prefix, path } => {
                format!("\"{}{}\"", escape(prefix), unquoted_path(path))
            }
        }
    }

    fn set_default(&self, w: &mut LineWriter, var: ScriptVar, value: &str) {
        w.block(format!("if (-not $env:{}) {{", var.name()), "}", |w| {
            w.line(format!("$env:{} = {}", var.name(), value));
        });
        w.blank();
    }

    fn check_exit(&self, w: &mut LineWriter, message: &str) {
        w.line(format!(
            "if ($LASTEXITCODE -ne 0) {{ Stop-Deployment {} }}",
            quote(message)
        ));
    }
}

impl Dialect for PoshDialect {
    fn newline(&self) -> &'static str {
        "\n"
    }

    fn header(&self, w: &mut LineWriter) {
        w.line("# ----------------------");
        w.line("# KUDU Deployment Script");
        w.line(format!("# Version: {GENERATOR_VERSION}"));
        w.line("# ----------------------");
        w.blank();
        w.line("$ErrorActionPreference = \"Stop\"");
        w.blank();
        self.section(w, "Helpers");
        w.block("function Stop-Deployment([string]$message) {", "}", |w| {
            w.line("Write-Output \"An error has occurred during web site deployment.\"");
            w.line("Write-Output $message");
            w.line("exit 1");
        });
        w.blank();
    }

    fn comment(&self, w: &mut LineWriter, text: &str) {
        w.line(format!("# {text}"));
    }

    fn echo(&self, w: &mut LineWriter, text: &str) {
        w.line(format!("Write-Output {}", quote(text)));
    }

    fn section(&self, w: &mut LineWriter, title: &str) {
        if title == "Deployment" {
            w.line(BANNER);
        }
        self.comment(w, title);
        self.comment(w, &"-".repeat(title.len()));
        w.blank();
    }

    fn setup(&self, w: &mut LineWriter, variables: &ScriptVariables, used: &BTreeSet<ScriptVar>) {
        let source = quote(&variables.repository_root.display().to_string());
        self.set_default(w, ScriptVar::DeploymentSource, &source);
        let site = match &variables.site_in_source {
            Some(rest) => self.path(&ScriptPath {
                base: ScriptVar::DeploymentSource,
                relative: rest.clone(),
            }),
            None => quote(&variables.site_path.display().to_string()),
        };
        self.set_default(w, ScriptVar::DeploymentSite, &site);
        let output = quote(&variables.output_path.display().to_string());
        self.set_default(w, ScriptVar::DeploymentOutput, &output);
        self.set_default(w, ScriptVar::Artifacts, "\"${env:DEPLOYMENT_OUTPUT}\\..\\artifacts\"");
        self.set_default(w, ScriptVar::DeploymentTarget, "\"${env:ARTIFACTS}\\wwwroot\"");

        w.block("if (-not $env:NEXT_MANIFEST_PATH) {", "}", |w| {
            w.line("$env:NEXT_MANIFEST_PATH = \"${env:ARTIFACTS}\\manifest\"");
            w.blank();
            w.block("if (-not $env:PREVIOUS_MANIFEST_PATH) {", "}", |w| {
                w.line("$env:PREVIOUS_MANIFEST_PATH = $env:NEXT_MANIFEST_PATH");
            });
        });
        w.blank();

        w.block("if (-not $env:KUDU_SYNC_CMD) {", "}", |w| {
            w.line("Write-Output \"Installing Kudu Sync\"");
            w.line("npm install kudusync -g --silent");
            self.check_exit(w, "npm failed");
            w.blank();
            w.line("$env:KUDU_SYNC_CMD = \"${env:APPDATA}\\npm\\kuduSync.cmd\"");
        });
        w.blank();

        if used.contains(&ScriptVar::DeploymentTemp) {
            w.block("if (-not $env:DEPLOYMENT_TEMP) {", "}", |w| {
                w.line("$env:DEPLOYMENT_TEMP = Join-Path ([System.IO.Path]::GetTempPath()) (\"___deployTemp\" + (Get-Random))");
                w.line("$env:CLEAN_LOCAL_DEPLOYMENT_TEMP = \"true\"");
            });
            w.blank();
            w.block("if ($env:CLEAN_LOCAL_DEPLOYMENT_TEMP) {", "}", |w| {
                w.line("if (Test-Path $env:DEPLOYMENT_TEMP) { Remove-Item -Recurse -Force $env:DEPLOYMENT_TEMP }");
                w.line("New-Item -ItemType Directory -Path $env:DEPLOYMENT_TEMP | Out-Null");
            });
            w.blank();
        }

        if used.contains(&ScriptVar::MsBuildPath) {
            self.set_default(
                w,
                ScriptVar::MsBuildPath,
                "\"${env:ProgramFiles(x86)}\\MSBuild\\14.0\\Bin\\MSBuild.exe\"",
            );
        }
    }

    fn require_tool(&self, w: &mut LineWriter, requirement: &ToolRequirement) {
        self.comment(w, &format!("Verify {} installed", requirement.display_name));
        w.block(
            format!(
                "if (-not (Get-Command {} -ErrorAction SilentlyContinue)) {{",
                requirement.program
            ),
            "}",
            |w| {
                w.line(format!(
                    "Stop-Deployment {}",
                    quote(&format!(
                        "Missing {0} executable, please install {0}, if already installed make sure it can be reached from current environment.",
                        requirement.display_name
                    ))
                ));
            },
        );
        if let Some(version) = &requirement.version_prefix {
            w.block(
                format!(
                    "if (-not ((& {} --version) -like {})) {{",
                    requirement.program,
                    quote(&format!("{version}*"))
                ),
                "}",
                |w| {
                    w.line(format!(
                        "Stop-Deployment {}",
                        quote(&format!(
                            "{} version {} is required.",
                            requirement.display_name, version
                        ))
                    ));
                },
            );
        }
    }

    fn run(&self, w: &mut LineWriter, step: &CommandStep) {
        let program = match &step.program {
            Program::Tool(name) => name.clone(),
            Program::Var(var) => format!("& \"${{env:{}}}\"", var.name()),
        };
        let mut parts = vec![program];
        parts.extend(step.args.iter().map(|a| self.arg(a)));
        let command = parts.join(" ");
        let message = failure_message(step);

        let body = |w: &mut LineWriter| {
            if let Some(dir) = &step.working_dir {
                w.line(format!("Push-Location {}", self.path(dir)));
            }
            w.line(&command);
            self.check_exit(w, &message);
            if step.working_dir.is_some() {
                w.line("Pop-Location");
            }
        };
        match &step.only_if_exists {
            Some(file) => w.block(format!("if (Test-Path {}) {{", self.path(file)), "}", body),
            None => body(w),
        }
    }

    fn sync(&self, w: &mut LineWriter, step: &SyncStep) {
        let source = self.path(&step.source);
        let exclude = quote(&step.exclude.join(";"));
        w.block("if ($env:IN_PLACE_DEPLOYMENT -ne \"1\") {", "}", |w| {
            w.line(format!(
                "& \"${{env:KUDU_SYNC_CMD}}\" -v 50 -f {source} -t \"${{env:DEPLOYMENT_TARGET}}\" -n \"${{env:NEXT_MANIFEST_PATH}}\" -p \"${{env:PREVIOUS_MANIFEST_PATH}}\" -i {exclude}"
            ));
            self.check_exit(w, "Kudu Sync failed");
        });
    }

    fn ensure_file(&self, w: &mut LineWriter, step: &EnsureFileStep) {
        let target = self.path(&step.path);
        w.block(
            format!(
                "if ((Test-Path {}) -and -not (Test-Path {target})) {{",
                self.path(&step.when_exists)
            ),
            "}",
            |w| {
                w.line(format!("Set-Content -Path {target} -Value @'"));
                for line in step.contents.lines() {
                    w.raw(line);
                }
                w.raw("'@");
            },
        );
    }

    fn marker(&self, w: &mut LineWriter, marker: &DeploymentMarker) {
        self.comment(
            w,
            &format!(
                "Re-run through {} with script_type = {}",
                DeploymentMarker::FILE_NAME,
                marker.script_type
            ),
        );
    }

    fn footer(&self, w: &mut LineWriter, used: &BTreeSet<ScriptVar>) {
        w.line(BANNER);
        self.comment(w, "Post deployment stub");
        w.block("if ($env:POST_DEPLOYMENT_ACTION) {", "}", |w| {
            w.line("& $env:POST_DEPLOYMENT_ACTION");
            self.check_exit(w, "Post deployment action failed");
        });
        w.blank();

        if used.contains(&ScriptVar::DeploymentTemp) {
            w.block("if ($env:CLEAN_LOCAL_DEPLOYMENT_TEMP) {", "}", |w| {
                w.line("if (Test-Path $env:DEPLOYMENT_TEMP) { Remove-Item -Recurse -Force $env:DEPLOYMENT_TEMP }");
            });
            w.blank();
        }

        w.line("Write-Output \"Finished successfully.\"");
    }
}

fn unquoted_path(path: &ScriptPath) -> String {
    let mut out = format!("${{env:{}}}", path.base.name());
    for segment in &path.relative {
        out.push('\\');
        out.push_str(&escape(segment));
    }
    out
}

/// Escape for use inside a double-quoted (expandable) string.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '`' | '"' | '$') {
            out.push('`');
        }
        out.push(c);
    }
    out
}

fn quote(value: &str) -> String {
    format!("\"{}\"", escape(value))
}
