//! TOML parser with helpful error messages

use std::path::Path;

use anyhow::{Context, Result};

use super::schema::GeneratorConfig;

/// Parse a configuration file with detailed error messages
pub fn parse_config(path: &Path) -> Result<GeneratorConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse configuration content from string
pub fn parse_config_str(content: &str) -> Result<GeneratorConfig> {
    let config: GeneratorConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &GeneratorConfig) -> Result<()> {
    if let Some(sdk) = &config.dotnet_sdk
        && sdk.trim().is_empty()
    {
        anyhow::bail!("dotnet_sdk must not be empty");
    }
    for name in &config.exclude {
        if name.trim().is_empty() {
            anyhow::bail!("exclude entries must not be empty");
        }
        if name.contains(';') {
            anyhow::bail!("exclude entry '{}' must not contain ';'", name);
        }
    }
    Ok(())
}

/// Enhance TOML parsing errors with the offending line
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let Some(span) = error.span() else {
        return anyhow::anyhow!("TOML parsing error: {}", error.message());
    };

    let before = content.get(..span.start).unwrap_or(content);
    let line_num = before.matches('\n').count() + 1;
    let context = get_line_context(content, line_num);
    anyhow::anyhow!(
        "TOML parsing error at line {}:\n{}\n\nError: {}",
        line_num,
        context,
        error.message()
    )
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());
    if start >= end {
        return String::new();
    }

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>4} | {}", start + i + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScriptType;

    #[test]
    fn parse_full_config() {
        let config = parse_config_str(
            r#"
script_type = "bash"
dot_deployment = false
include_dependencies = true
dotnet_sdk = "8.0"
exclude = ["docs", "*.log"]
"#,
        )
        .unwrap();

        assert_eq!(config.script_type, Some(ScriptType::Bash));
        assert_eq!(config.dot_deployment, Some(false));
        assert_eq!(config.include_dependencies, Some(true));
        assert_eq!(config.dotnet_sdk.as_deref(), Some("8.0"));
        assert_eq!(config.exclude, vec!["docs", "*.log"]);
    }

    #[test]
    fn parse_empty_config() {
        let config = parse_config_str("").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = parse_config_str("script_type = \"bash\"\nscript = \"x\"\n").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("script"), "{message}");
    }

    #[test]
    fn unknown_script_type_is_rejected() {
        assert!(parse_config_str("script_type = \"fish\"").is_err());
    }

    #[test]
    fn exclude_with_separator_is_rejected() {
        let err = parse_config_str("exclude = [\"a;b\"]").unwrap_err();
        assert!(err.to_string().contains("';'"));
    }
}
