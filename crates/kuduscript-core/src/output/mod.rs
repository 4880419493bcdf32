//! Persist generated files, asking before replacing existing ones.
//!
//! A write moves through checking, confirming (only when the path exists),
//! then writing or skipping. Declining is a normal outcome, not an error.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::error::WriteError;

/// Asks whether an existing file may be replaced.
pub trait ConfirmOverwrite {
    fn confirm(&mut self, message: &str) -> io::Result<bool>;
}

impl<F> ConfirmOverwrite for F
where
    F: FnMut(&str) -> io::Result<bool>,
{
    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        self(message)
    }
}

/// Replaces existing files without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmOverwrite for AlwaysConfirm {
    fn confirm(&mut self, _message: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteOutcome {
    Created,
    Overwritten,
    /// The file existed and the user declined; it was left untouched.
    Declined,
}

impl WriteOutcome {
    pub fn is_written(self) -> bool {
        !matches!(self, WriteOutcome::Declined)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WriteOutcome::Created => "created",
            WriteOutcome::Overwritten => "overwritten",
            WriteOutcome::Declined => "declined",
        }
    }
}

impl std::fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write `content` to `path`, consulting `confirm` if `path` already exists.
pub fn write(
    path: &Path,
    content: &str,
    confirm: &mut dyn ConfirmOverwrite,
) -> Result<WriteOutcome, WriteError> {
    tracing::debug!(path = %path.display(), "checking output file");

    let exists = path.exists();
    if exists {
        let message = format!("{} already exists, overwrite?", path.display());
        tracing::debug!(path = %path.display(), "confirming overwrite");
        let accepted = confirm
            .confirm(&message)
            .map_err(|source| WriteError::Prompt { source })?;
        if !accepted {
            tracing::info!(path = %path.display(), "kept existing file");
            return Ok(WriteOutcome::Declined);
        }
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| WriteError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    tracing::debug!(path = %path.display(), bytes = content.len(), "writing output file");
    fs::write(path, content).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    mark_executable(path)?;

    Ok(if exists {
        WriteOutcome::Overwritten
    } else {
        WriteOutcome::Created
    })
}

/// Shell scripts get the execute bit so they can be run directly.
#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), WriteError> {
    use std::os::unix::fs::PermissionsExt;

    if path.extension().is_none_or(|ext| ext != "sh") {
        return Ok(());
    }
    let io_err = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut permissions = fs::metadata(path).map_err(io_err)?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions).map_err(io_err)
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), WriteError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_missing_file_without_prompting() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("deploy.cmd");
        let mut asked = false;
        let mut confirm = |_: &str| -> io::Result<bool> {
            asked = true;
            Ok(false)
        };

        let outcome = write(&path, "echo hi", &mut confirm).unwrap();

        assert_eq!(outcome, WriteOutcome::Created);
        assert!(!asked);
        assert_eq!(fs::read_to_string(&path).unwrap(), "echo hi");
    }

    #[test]
    fn prompt_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deploy.cmd");
        fs::write(&path, "old").unwrap();
        let mut confirm = |_: &str| -> io::Result<bool> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"))
        };

        let err = write(&path, "new", &mut confirm).unwrap_err();

        assert!(matches!(err, WriteError::Prompt { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[cfg(unix)]
    #[test]
    fn shell_scripts_are_executable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deploy.sh");
        write(&path, "#!/bin/bash\n", &mut AlwaysConfirm).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
