//! Configuration layer merging logic
//!
//! Implements the 2-layer merge strategy: Global -> Repository.

use super::schema::GeneratorConfig;

/// Merge configuration layers, later layers winning for scalar keys.
///
/// `exclude` lists are concatenated in layer order with duplicates removed.
pub fn merge_configs(
    global: Option<GeneratorConfig>,
    repository: Option<GeneratorConfig>,
) -> GeneratorConfig {
    let mut merged = global.unwrap_or_default();
    if let Some(layer) = repository {
        merge_layer(&mut merged, layer);
    }
    merged
}

fn merge_layer(base: &mut GeneratorConfig, layer: GeneratorConfig) {
    if layer.script_type.is_some() {
        base.script_type = layer.script_type;
    }
    if layer.dot_deployment.is_some() {
        base.dot_deployment = layer.dot_deployment;
    }
    if layer.include_dependencies.is_some() {
        base.include_dependencies = layer.include_dependencies;
    }
    if layer.dotnet_sdk.is_some() {
        base.dotnet_sdk = layer.dotnet_sdk;
    }
    for name in layer.exclude {
        if !base.exclude.contains(&name) {
            base.exclude.push(name);
        }
    }
}
