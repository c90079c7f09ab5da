use crate::config::BridgeConfig;
use anyhow::Result;
use std::path::Path;

/// Reads a configuration file, picking the format from its extension.
/// Validation is left to the caller since credentials usually arrive
/// through the environment afterwards.
pub async fn parse_config_from_file(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path).await?;

    match path.extension().and_then(|s| s.to_str()) {
        Some(extension) => parse_config_from_str(&contents, extension),
        None => Err(anyhow::anyhow!(
            "Unsupported file format. Use .yaml, .yml, .toml, or .json"
        )),
    }
}

pub fn parse_config_from_str(content: &str, format: &str) -> Result<BridgeConfig> {
    match format.to_lowercase().as_str() {
        "yaml" | "yml" => parse_yaml(content),
        "toml" => parse_toml(content),
        "json" => parse_json(content),
        _ => Err(anyhow::anyhow!("Unsupported format: {}", format)),
    }
}

fn parse_yaml(content: &str) -> Result<BridgeConfig> {
    Ok(serde_yaml::from_str(content)?)
}

fn parse_toml(content: &str) -> Result<BridgeConfig> {
    Ok(toml::from_str(content)?)
}

fn parse_json(content: &str) -> Result<BridgeConfig> {
    Ok(serde_json::from_str(content)?)
}
