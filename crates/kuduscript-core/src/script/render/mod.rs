//! Render script steps into literal text for one script flavor.
//!
//! Rendering is pure: the same context, steps and flavor always produce the
//! same bytes. Each flavor lives in its own dialect module; this module owns
//! the section layout shared by all of them.

mod bash;
mod batch;
mod posh;

use std::collections::BTreeSet;

use crate::types::ScriptType;

use super::{
    CommandStep, DeploymentMarker, EnsureFileStep, ScriptStep, ScriptVar, ScriptVariables,
    SyncStep, ToolRequirement,
};

/// Version stamped into generated script headers.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Inputs to rendering besides the step list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Label used in the "Handling ... deployment." banner.
    pub title: String,
    pub variables: ScriptVariables,
}

/// Rendered script text tagged with its flavor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDocument {
    script_type: ScriptType,
    text: String,
}

impl ScriptDocument {
    pub fn script_type(&self) -> ScriptType {
        self.script_type
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Render `steps` as a complete `script_type` script.
pub fn render(
    context: &RenderContext,
    steps: &[ScriptStep],
    script_type: ScriptType,
) -> ScriptDocument {
    let dialect: &dyn Dialect = match script_type {
        ScriptType::Batch => &batch::BatchDialect,
        ScriptType::Bash => &bash::BashDialect,
        ScriptType::Posh => &posh::PoshDialect,
    };
    let used = used_variables(steps);
    let mut w = LineWriter::new(dialect.newline());

    dialect.header(&mut w);

    let requirements: Vec<&ToolRequirement> = steps
        .iter()
        .filter_map(|s| match s {
            ScriptStep::RequireTool(req) => Some(req),
            _ => None,
        })
        .collect();
    if !requirements.is_empty() {
        dialect.section(&mut w, "Prerequisites");
        for req in requirements {
            dialect.require_tool(&mut w, req);
            w.blank();
        }
    }

    dialect.section(&mut w, "Setup");
    dialect.setup(&mut w, &context.variables, &used);

    dialect.section(&mut w, "Deployment");
    dialect.echo(&mut w, &format!("Handling {} deployment.", context.title));
    w.blank();

    let deployment = steps
        .iter()
        .filter(|s| !matches!(s, ScriptStep::RequireTool(_)));
    for (index, step) in deployment.enumerate() {
        dialect.comment(&mut w, &format!("{}. {}", index + 1, step_title(step)));
        match step {
            ScriptStep::Run(run) => dialect.run(&mut w, run),
            ScriptStep::Sync(sync) => dialect.sync(&mut w, sync),
            ScriptStep::EnsureFile(ensure) => dialect.ensure_file(&mut w, ensure),
            ScriptStep::DeploymentMarker(marker) => dialect.marker(&mut w, marker),
            ScriptStep::RequireTool(_) => {}
        }
        w.blank();
    }

    dialect.footer(&mut w, &used);

    ScriptDocument {
        script_type,
        text: w.finish(),
    }
}

fn step_title(step: &ScriptStep) -> String {
    match step {
        ScriptStep::Run(run) => run.description.clone(),
        ScriptStep::Sync(_) => "KuduSync".to_string(),
        ScriptStep::EnsureFile(ensure) => ensure.description.clone(),
        ScriptStep::DeploymentMarker(marker) => format!(
            "Deployment marker ({}: command = {})",
            DeploymentMarker::FILE_NAME,
            marker.command
        ),
        ScriptStep::RequireTool(req) => format!("Verify {} installed", req.display_name),
    }
}

fn used_variables(steps: &[ScriptStep]) -> BTreeSet<ScriptVar> {
    steps.iter().flat_map(|s| s.variables()).collect()
}

/// Syntax of one script flavor.
trait Dialect {
    fn newline(&self) -> &'static str;
    fn header(&self, w: &mut LineWriter);
    fn comment(&self, w: &mut LineWriter, text: &str);
    fn echo(&self, w: &mut LineWriter, text: &str);
    fn section(&self, w: &mut LineWriter, title: &str) {
        self.comment(w, title);
        self.comment(w, &"-".repeat(title.len()));
        w.blank();
    }
    fn setup(&self, w: &mut LineWriter, variables: &ScriptVariables, used: &BTreeSet<ScriptVar>);
    fn require_tool(&self, w: &mut LineWriter, requirement: &ToolRequirement);
    fn run(&self, w: &mut LineWriter, step: &CommandStep);
    fn sync(&self, w: &mut LineWriter, step: &SyncStep);
    fn ensure_file(&self, w: &mut LineWriter, step: &EnsureFileStep);
    fn marker(&self, w: &mut LineWriter, marker: &DeploymentMarker);
    fn footer(&self, w: &mut LineWriter, used: &BTreeSet<ScriptVar>);
}

/// Line-oriented text builder with two-space block indentation.
struct LineWriter {
    buf: String,
    indent: usize,
    newline: &'static str,
}

impl LineWriter {
    fn new(newline: &'static str) -> Self {
        Self {
            buf: String::new(),
            indent: 0,
            newline,
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.buf.push_str("  ");
            }
            self.buf.push_str(text);
        }
        self.buf.push_str(self.newline);
    }

    /// Emit without indentation (here-document bodies).
    fn raw(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push_str(self.newline);
    }

    fn blank(&mut self) {
        self.buf.push_str(self.newline);
    }

    fn block(&mut self, open: impl AsRef<str>, close: &str, body: impl FnOnce(&mut Self)) {
        self.line(open);
        self.indent += 1;
        body(self);
        self.indent -= 1;
        self.line(close);
    }

    fn finish(self) -> String {
        self.buf
    }
}

/// Characters that never need quoting in any flavor.
fn is_plain(value: &str) -> bool {
    !value.is_empty()
        && value.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '=' | ',')
        })
}

fn failure_message(step: &CommandStep) -> String {
    format!("{} failed", step.description)
}
