//! POSIX shell (`deploy.sh`) dialect.

use std::collections::BTreeSet;

use crate::script::{
    Arg, CommandStep, DeploymentMarker, EnsureFileStep, Program, ScriptPath, ScriptVar,
    ScriptVariables, SyncStep, ToolRequirement,
};

use super::{Dialect, GENERATOR_VERSION, LineWriter, failure_message, is_plain};

const BANNER: &str = "##################################################################################################################################";

/// Here-document delimiter for embedded files.
const HEREDOC_END: &str = "KUDUSCRIPT_EOF";

pub(super) struct BashDialect;

impl BashDialect {
    fn path(&self, path: &ScriptPath) -> String {
        let mut out = format!("\"${}", path.base.name());
        for segment in &path.relative {
            out.push('/');
            out.push_str(&escape(segment));
        }
        out.push('"');
        out
    }

    fn arg(&self, arg: &Arg) -> String {
        match arg {
            Arg::Literal(value) if is_plain(value) => value.clone(),
            Arg::Literal(value) => quote(value),
            Arg::Path(path) => self.path(path),
            Arg::Prefixed { prefix, path } => {
                format!("{}{}", quote_if_needed(prefix), self.path(path))
            }
        }
    }

    fn set_default(&self, w: &mut LineWriter, var: ScriptVar, value: &str) {
        w.block(format!("if [[ -z \"${{{}:-}}\" ]]; then", var.name()), "fi", |w| {
            w.line(format!("{}={}", var.name(), value));
        });
        w.blank();
    }
}

impl Dialect for BashDialect {
    fn newline(&self) -> &'static str {
        "\n"
    }

    fn header(&self, w: &mut LineWriter) {
        w.line("#!/bin/bash");
        w.blank();
        w.line("# ----------------------");
        w.line("# KUDU Deployment Script");
        w.line(format!("# Version: {GENERATOR_VERSION}"));
        w.line("# ----------------------");
        w.blank();
        w.line("set -e");
        w.blank();
        self.section(w, "Helpers");
        w.block("failDeployment () {", "}", |w| {
            w.line("echo \"An error has occurred during web site deployment.\"");
            w.line("echo \"$1\"");
            w.line("exit 1");
        });
        w.blank();
    }

    fn comment(&self, w: &mut LineWriter, text: &str) {
        w.line(format!("# {text}"));
    }

    fn echo(&self, w: &mut LineWriter, text: &str) {
        w.line(format!("echo {}", quote(text)));
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
        self.set_default(w, ScriptVar::Artifacts, "\"$DEPLOYMENT_OUTPUT/../artifacts\"");
        self.set_default(w, ScriptVar::DeploymentTarget, "\"$ARTIFACTS/wwwroot\"");

        w.block("if [[ -z \"${NEXT_MANIFEST_PATH:-}\" ]]; then", "fi", |w| {
            w.line("NEXT_MANIFEST_PATH=\"$ARTIFACTS/manifest\"");
            w.blank();
            w.block("if [[ -z \"${PREVIOUS_MANIFEST_PATH:-}\" ]]; then", "fi", |w| {
                w.line("PREVIOUS_MANIFEST_PATH=\"$NEXT_MANIFEST_PATH\"");
            });
        });
        w.blank();

        w.block("if [[ -z \"${KUDU_SYNC_CMD:-}\" ]]; then", "fi", |w| {
            w.line("echo \"Installing Kudu Sync\"");
            w.line("npm install kudusync -g --silent || failDeployment \"npm failed\"");
            w.line("KUDU_SYNC_CMD=kuduSync");
        });
        w.blank();

        if used.contains(&ScriptVar::DeploymentTemp) {
            w.block("if [[ -z \"${DEPLOYMENT_TEMP:-}\" ]]; then", "fi", |w| {
                w.line("DEPLOYMENT_TEMP=\"$(mktemp -d)\"");
                w.line("CLEAN_LOCAL_DEPLOYMENT_TEMP=true");
            });
            w.blank();
        }

        if used.contains(&ScriptVar::MsBuildPath) {
            self.set_default(w, ScriptVar::MsBuildPath, "msbuild");
        }
    }

    fn require_tool(&self, w: &mut LineWriter, requirement: &ToolRequirement) {
        self.comment(w, &format!("Verify {} installed", requirement.display_name));
        w.line(format!(
            "hash {} 2>/dev/null || failDeployment {}",
            requirement.program,
            quote(&format!(
                "Missing {0} executable, please install {0}, if already installed make sure it can be reached from current environment.",
                requirement.display_name
            ))
        ));
        if let Some(version) = &requirement.version_prefix {
            w.block(
                format!(
                    "if [[ \"$({} --version)\" != {}* ]]; then",
                    requirement.program,
                    quote(version)
                ),
                "fi",
                |w| {
                    w.line(format!(
                        "failDeployment {}",
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
            Program::Var(var) => format!("\"${}\"", var.name()),
        };
        let mut parts = vec![program];
        parts.extend(step.args.iter().map(|a| self.arg(a)));
        let command = format!(
            "{} || failDeployment {}",
            parts.join(" "),
            quote(&failure_message(step))
        );

        let body = |w: &mut LineWriter| {
            if let Some(dir) = &step.working_dir {
                w.line(format!("pushd {} > /dev/null", self.path(dir)));
            }
            w.line(&command);
            if step.working_dir.is_some() {
                w.line("popd > /dev/null");
            }
        };
        match &step.only_if_exists {
            Some(file) => w.block(format!("if [ -e {} ]; then", self.path(file)), "fi", body),
            None => body(w),
        }
    }

    fn sync(&self, w: &mut LineWriter, step: &SyncStep) {
        let source = self.path(&step.source);
        let exclude = quote(&step.exclude.join(";"));
        w.block("if [[ \"${IN_PLACE_DEPLOYMENT:-}\" != \"1\" ]]; then", "fi", |w| {
            w.line(format!(
                "\"$KUDU_SYNC_CMD\" -v 50 -f {source} -t \"$DEPLOYMENT_TARGET\" -n \"$NEXT_MANIFEST_PATH\" -p \"$PREVIOUS_MANIFEST_PATH\" -i {exclude} || failDeployment \"Kudu Sync failed\""
            ));
        });
    }

    fn ensure_file(&self, w: &mut LineWriter, step: &EnsureFileStep) {
        let target = self.path(&step.path);
        w.block(
            format!(
                "if [ -e {} ] && [ ! -e {target} ]; then",
                self.path(&step.when_exists)
            ),
            "fi",
            |w| {
                w.line(format!(
                    "cat > {target} <<'{HEREDOC_END}' || failDeployment {}",
                    quote(&format!("{} failed", step.description))
                ));
                for line in step.contents.lines() {
                    w.raw(line);
                }
                w.raw(HEREDOC_END);
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
        w.block("if [[ -n \"${POST_DEPLOYMENT_ACTION:-}\" ]]; then", "fi", |w| {
            w.line("\"$POST_DEPLOYMENT_ACTION\" || failDeployment \"Post deployment action failed\"");
        });
        w.blank();

        if used.contains(&ScriptVar::DeploymentTemp) {
            w.block("if [[ -n \"${CLEAN_LOCAL_DEPLOYMENT_TEMP:-}\" ]]; then", "fi", |w| {
                w.line("rm -rf \"$DEPLOYMENT_TEMP\"");
            });
            w.blank();
        }

        w.line("echo \"Finished successfully.\"");
    }
}

/// Escape for use inside double quotes.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn quote(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

fn quote_if_needed(value: &str) -> String {
    if is_plain(value) {
        value.to_string()
    } else {
        quote(value)
    }
}
