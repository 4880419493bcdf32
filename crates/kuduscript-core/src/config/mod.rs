//! Generator configuration for different scopes
//!
//! Supports two configuration scopes:
//! - Global: per-user defaults in the platform config directory
//! - Repository: `.kuduscript.toml` checked into the repository root

pub mod merge;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use merge::merge_configs;
pub use parser::{parse_config, parse_config_str};
pub use paths::config_path_for_scope;
pub use schema::GeneratorConfig;
pub use store::ConfigStore;

/// Configuration scope levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigScope {
    /// Per-user configuration
    Global,
    /// Per-repository configuration (committed alongside the code)
    Repository,
}

/// Load and merge the global and repository layers for `repository_root`.
pub fn load_effective(
    global_dir: Option<&Path>,
    repository_root: &Path,
) -> anyhow::Result<GeneratorConfig> {
    let global = global_dir
        .map(|dir| {
            ConfigStore::from_paths(
                ConfigScope::Global,
                dir.to_path_buf(),
                repository_root.to_path_buf(),
            )
            .load()
        })
        .transpose()?;
    let repository = ConfigStore::from_paths(
        ConfigScope::Repository,
        PathBuf::new(),
        repository_root.to_path_buf(),
    )
    .load()?;

    Ok(merge_configs(global, Some(repository)))
}
