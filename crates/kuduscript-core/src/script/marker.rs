//! The `.deployment` marker telling a hosting pipeline which script to run.

use std::path::Path;

use serde::Serialize;

use crate::types::ScriptType;

use super::path_segments;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentMarker {
    /// Command line the pipeline runs from the repository root.
    pub command: String,
    pub script_type: ScriptType,
}

impl DeploymentMarker {
    pub const FILE_NAME: &'static str = ".deployment";

    /// Marker invoking `script_path`, addressed relative to `repository_root`
    /// when the script lives inside it.
    pub fn for_script(repository_root: &Path, script_path: &Path, script_type: ScriptType) -> Self {
        let separator = if script_type.uses_backslash() { "\\" } else { "/" };
        let script = match script_path.strip_prefix(repository_root) {
            Ok(rest) => path_segments(rest).join(separator),
            Err(_) => script_path.display().to_string(),
        };
        let script = quote_if_spaced(&script);

        let command = match script_type {
            ScriptType::Batch => script,
            ScriptType::Bash => format!("bash {script}"),
            ScriptType::Posh => format!(
                "powershell -NoProfile -NoLogo -ExecutionPolicy Unrestricted -File {script}"
            ),
        };

        Self {
            command,
            script_type,
        }
    }

    /// Marker file contents.
    pub fn to_ini(&self) -> String {
        format!(
            "[config]\ncommand = {}\nscript_type = {}\n",
            self.command, self.script_type
        )
    }
}

fn quote_if_spaced(value: &str) -> String {
    if value.contains(' ') {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_marker_runs_script_directly() {
        let marker = DeploymentMarker::for_script(
            Path::new("/repo"),
            Path::new("/repo/deploy.cmd"),
            ScriptType::Batch,
        );
        assert_eq!(
            marker.to_ini(),
            "[config]\ncommand = deploy.cmd\nscript_type = batch\n"
        );
    }

    #[test]
    fn bash_marker_in_subdirectory() {
        let marker = DeploymentMarker::for_script(
            Path::new("/repo"),
            Path::new("/repo/build/deploy.sh"),
            ScriptType::Bash,
        );
        assert_eq!(marker.command, "bash build/deploy.sh");
    }

    #[test]
    fn posh_marker_uses_file_switch() {
        let marker = DeploymentMarker::for_script(
            Path::new("/repo"),
            Path::new("/repo/deploy.ps1"),
            ScriptType::Posh,
        );
        assert!(marker.command.starts_with("powershell "));
        assert!(marker.command.ends_with("-File deploy.ps1"));
    }

    #[test]
    fn script_outside_repository_is_absolute() {
        let marker = DeploymentMarker::for_script(
            Path::new("/repo"),
            Path::new("/out dir/deploy.sh"),
            ScriptType::Bash,
        );
        assert_eq!(marker.command, "bash \"/out dir/deploy.sh\"");
    }
}
