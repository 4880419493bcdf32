//! Windows batch (`deploy.cmd`) dialect.

use std::collections::BTreeSet;

use crate::script::{
    Arg, CommandStep, DeploymentMarker, EnsureFileStep, Program, ScriptPath, ScriptVar,
    ScriptVariables, SyncStep, ToolRequirement,
};

use super::{Dialect, GENERATOR_VERSION, LineWriter, is_plain};

const BANNER: &str = "::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::::";

pub(super) struct BatchDialect;

impl BatchDialect {
    fn path(&self, path: &ScriptPath) -> String {
        format!("\"{}\"", unquoted_path(path))
    }

    fn arg(&self, arg: &Arg) -> String {
        match arg {
            Arg::Literal(value) if is_plain(value) => value.clone(),
            Arg::Literal(value) => quote(value),
            Arg::Path(path) => self.path(path),
            Arg::Prefixed { prefix, path } => format!("{}{}", escape(prefix), self.path(path)),
        }
    }

    fn command_line(&self, step: &CommandStep) -> String {
        let program = match &step.program {
            Program::Tool(name) => name.clone(),
            Program::Var(var) => format!("\"%{}%\"", var.name()),
        };
        let mut parts = vec![program];
        parts.extend(step.args.iter().map(|a| self.arg(a)));
        format!("call :ExecuteCmd {}", parts.join(" "))
    }

    fn set_default(&self, w: &mut LineWriter, var: ScriptVar, value: &str) {
        w.block(format!("IF NOT DEFINED {} (", var.name()), ")", |w| {
            w.line(format!("SET \"{}={}\"", var.name(), value));
        });
        w.blank();
    }
}

impl Dialect for BatchDialect {
    fn newline(&self) -> &'static str {
        "\r\n"
    }

    fn header(&self, w: &mut LineWriter) {
        w.line("@if \"%SCM_TRACE_LEVEL%\" NEQ \"4\" @echo off");
        w.blank();
        w.line(":: ----------------------");
        w.line(":: KUDU Deployment Script");
        w.line(format!(":: Version: {GENERATOR_VERSION}"));
        w.line(":: ----------------------");
        w.blank();
    }

    fn comment(&self, w: &mut LineWriter, text: &str) {
        w.line(format!(":: {text}"));
    }

    fn echo(&self, w: &mut LineWriter, text: &str) {
        w.line(format!("echo {}", escape_echo(text)));
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
        w.line("setlocal enabledelayedexpansion");
        w.blank();

        let source = escape(&variables.repository_root.display().to_string());
        self.set_default(w, ScriptVar::DeploymentSource, &source);
        let site = match &variables.site_in_source {
            Some(rest) => unquoted_path(&ScriptPath {
                base: ScriptVar::DeploymentSource,
                relative: rest.clone(),
            }),
            None => escape(&variables.site_path.display().to_string()),
        };
        self.set_default(w, ScriptVar::DeploymentSite, &site);
        let output = escape(&variables.output_path.display().to_string());
        self.set_default(w, ScriptVar::DeploymentOutput, &output);
        self.set_default(w, ScriptVar::Artifacts, "%DEPLOYMENT_OUTPUT%\\..\\artifacts");
        self.set_default(w, ScriptVar::DeploymentTarget, "%ARTIFACTS%\\wwwroot");

        w.block("IF NOT DEFINED NEXT_MANIFEST_PATH (", ")", |w| {
            w.line("SET \"NEXT_MANIFEST_PATH=%ARTIFACTS%\\manifest\"");
            w.blank();
            w.block("IF NOT DEFINED PREVIOUS_MANIFEST_PATH (", ")", |w| {
                w.line("SET \"PREVIOUS_MANIFEST_PATH=%ARTIFACTS%\\manifest\"");
            });
        });
        w.blank();

        w.block("IF NOT DEFINED KUDU_SYNC_CMD (", ")", |w| {
            w.line("echo Installing Kudu Sync");
            w.line("call npm install kudusync -g --silent");
            w.line("IF !ERRORLEVEL! NEQ 0 goto error");
            w.blank();
            w.line("SET \"KUDU_SYNC_CMD=%appdata%\\npm\\kuduSync.cmd\"");
        });
        w.blank();

        if used.contains(&ScriptVar::DeploymentTemp) {
            w.block("IF NOT DEFINED DEPLOYMENT_TEMP (", ")", |w| {
                w.line("SET \"DEPLOYMENT_TEMP=%temp%\\___deployTemp%random%\"");
                w.line("SET CLEAN_LOCAL_DEPLOYMENT_TEMP=true");
            });
            w.blank();
            w.block("IF DEFINED CLEAN_LOCAL_DEPLOYMENT_TEMP (", ")", |w| {
                w.line("IF EXIST \"%DEPLOYMENT_TEMP%\" rd /s /q \"%DEPLOYMENT_TEMP%\"");
                w.line("mkdir \"%DEPLOYMENT_TEMP%\"");
            });
            w.blank();
        }

        if used.contains(&ScriptVar::MsBuildPath) {
            self.set_default(
                w,
                ScriptVar::MsBuildPath,
                "%ProgramFiles(x86)%\\MSBuild\\14.0\\Bin\\MSBuild.exe",
            );
        }
    }

    fn require_tool(&self, w: &mut LineWriter, requirement: &ToolRequirement) {
        self.comment(w, &format!("Verify {} installed", requirement.display_name));
        w.line(format!("where {} 2>nul >nul", requirement.program));
        w.block("IF %ERRORLEVEL% NEQ 0 (", ")", |w| {
            w.line(format!(
                "echo Missing {0} executable, please install {0}, if already installed make sure it can be reached from current environment.",
                requirement.display_name
            ));
            w.line("goto error");
        });
        if let Some(version) = &requirement.version_prefix {
            w.line(format!(
                "{} --version | findstr /B /C:\"{}\" >nul",
                requirement.program,
                escape(version)
            ));
            w.block("IF %ERRORLEVEL% NEQ 0 (", ")", |w| {
                w.line(format!(
                    "echo {} version {} is required.",
                    requirement.display_name,
                    escape_echo(version)
                ));
                w.line("goto error");
            });
        }
    }

    fn run(&self, w: &mut LineWriter, step: &CommandStep) {
        let body = |w: &mut LineWriter| {
            if let Some(dir) = &step.working_dir {
                w.line(format!("pushd {}", self.path(dir)));
            }
            w.line(self.command_line(step));
            w.line("IF !ERRORLEVEL! NEQ 0 goto error");
            if step.working_dir.is_some() {
                w.line("popd");
            }
        };
        match &step.only_if_exists {
            Some(file) => w.block(format!("IF EXIST {} (", self.path(file)), ")", body),
            None => body(w),
        }
    }

    fn sync(&self, w: &mut LineWriter, step: &SyncStep) {
        let source = self.path(&step.source);
        let exclude = quote(&step.exclude.join(";"));
        w.block("IF /I \"%IN_PLACE_DEPLOYMENT%\" NEQ \"1\" (", ")", |w| {
            w.line(format!(
                "call :ExecuteCmd \"%KUDU_SYNC_CMD%\" -v 50 -f {source} -t \"%DEPLOYMENT_TARGET%\" -n \"%NEXT_MANIFEST_PATH%\" -p \"%PREVIOUS_MANIFEST_PATH%\" -i {exclude}"
            ));
            w.line("IF !ERRORLEVEL! NEQ 0 goto error");
        });
    }

    fn ensure_file(&self, w: &mut LineWriter, step: &EnsureFileStep) {
        let target = self.path(&step.path);
        w.block(format!("IF EXIST {} (", self.path(&step.when_exists)), ")", |w| {
            w.block(format!("IF NOT EXIST {target} ("), ")", |w| {
                w.block("(", &format!(") > {target}"), |w| {
                    for line in step.contents.lines() {
                        if line.trim().is_empty() {
                            w.line("echo.");
                        } else {
                            w.line(format!("echo {}", escape_echo(line)));
                        }
                    }
                });
                w.line("IF !ERRORLEVEL! NEQ 0 goto error");
            });
        });
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
        w.line("IF DEFINED POST_DEPLOYMENT_ACTION call \"%POST_DEPLOYMENT_ACTION%\"");
        w.line("IF !ERRORLEVEL! NEQ 0 goto error");
        w.blank();

        if used.contains(&ScriptVar::DeploymentTemp) {
            w.block("IF DEFINED CLEAN_LOCAL_DEPLOYMENT_TEMP (", ")", |w| {
                w.line("IF EXIST \"%DEPLOYMENT_TEMP%\" rd /s /q \"%DEPLOYMENT_TEMP%\"");
            });
            w.blank();
        }

        w.line("goto end");
        w.blank();
        self.comment(w, "Execute command routine that will echo out when error");
        w.line(":ExecuteCmd");
        w.line("setlocal");
        w.line("set _CMD_=%*");
        w.line("call %_CMD_%");
        w.line("if \"%ERRORLEVEL%\" NEQ \"0\" echo Failed exitCode=%ERRORLEVEL%, command=%_CMD_%");
        w.line("exit /b %ERRORLEVEL%");
        w.blank();
        w.line(":error");
        w.line("endlocal");
        w.line("echo An error has occurred during web site deployment.");
        w.line("call :exitSetErrorLevel");
        w.line("call :exitFromFunction 2>nul");
        w.blank();
        w.line(":exitSetErrorLevel");
        w.line("exit /b 1");
        w.blank();
        w.line(":exitFromFunction");
        w.line("()");
        w.blank();
        w.line(":end");
        w.line("endlocal");
        w.line("echo Finished successfully.");
    }
}

fn unquoted_path(path: &ScriptPath) -> String {
    let mut out = format!("%{}%", path.base.name());
    for segment in &path.relative {
        out.push('\\');
        out.push_str(&escape(segment));
    }
    out
}

/// Escape `%` and `!` so a literal survives both expansion passes.
///
/// Delayed expansion strips one level of carets from any line holding a
/// `!`, so literal carets are doubled only in that case.
fn escape(value: &str) -> String {
    let delayed = value.contains('!');
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%%"),
            '!' => out.push_str("^!"),
            '^' if delayed => out.push_str("^^"),
            _ => out.push(c),
        }
    }
    out
}

fn quote(value: &str) -> String {
    format!("\"{}\"", escape(value).replace('"', "\"\""))
}

/// Escape text for an unquoted `echo` inside a parenthesized block.
fn escape_echo(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '^' | '&' | '|' | '<' | '>' | '(' | ')' => {
                out.push('^');
                out.push(c);
            }
            '%' => out.push_str("%%"),
            '!' => out.push_str("^^!"),
            _ => out.push(c),
        }
    }
    out
}
