//! Config path resolution helpers.

use std::path::{Path, PathBuf};

use super::ConfigScope;

/// File name of the global configuration.
pub const GLOBAL_CONFIG_FILE: &str = "kuduscript.toml";

/// File name of the repository configuration.
pub const REPOSITORY_CONFIG_FILE: &str = ".kuduscript.toml";

pub fn config_path_for_scope(
    scope: ConfigScope,
    global_dir: &Path,
    repository_root: &Path,
) -> PathBuf {
    match scope {
        ConfigScope::Global => global_dir.join(GLOBAL_CONFIG_FILE),
        ConfigScope::Repository => repository_root.join(REPOSITORY_CONFIG_FILE),
    }
}

/// Platform directory holding the global configuration.
pub fn default_global_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("kuduscript"))
}
