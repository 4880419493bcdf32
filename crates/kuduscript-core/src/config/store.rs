//! Config store for loading one kuduscript configuration layer.

use std::path::PathBuf;

use super::{ConfigScope, GeneratorConfig, parser, paths::config_path_for_scope};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    scope: ConfigScope,
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn from_paths(scope: ConfigScope, global_dir: PathBuf, repository_root: PathBuf) -> Self {
        let config_path = config_path_for_scope(scope, &global_dir, &repository_root);
        Self { scope, config_path }
    }

    /// Load the file, treating a missing file as an empty configuration.
    pub fn load(&self) -> anyhow::Result<GeneratorConfig> {
        if !self.config_path.exists() {
            tracing::debug!(
                scope = ?self.scope,
                path = %self.config_path.display(),
                "no config file"
            );
            return Ok(GeneratorConfig::new());
        }
        parser::parse_config(&self.config_path)
    }
}
