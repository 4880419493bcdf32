//! Schema of `kuduscript.toml`.

use serde::Deserialize;

use crate::types::ScriptType;

/// Defaults applied when the matching command-line flag is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Script flavor to generate
    pub script_type: Option<ScriptType>,

    /// Whether to write the `.deployment` marker file
    pub dot_deployment: Option<bool>,

    /// Copy dependency caches (e.g. `node_modules`) instead of excluding them
    pub include_dependencies: Option<bool>,

    /// .NET SDK version prefix the generated script requires
    pub dotnet_sdk: Option<String>,

    /// Additional names excluded from the sync step
    pub exclude: Vec<String>,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
