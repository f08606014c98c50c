mod schema;

pub use schema::{Config, DomainCaps, InputType, Item, RangeBand, ScoreMapping};

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Load a questionnaire configuration from a file.
///
/// Files with a `.yaml` or `.yml` extension parse as YAML; anything else
/// parses as JSON.
///
/// # Errors
///
/// Returns an error if:
/// - The config file does not exist or cannot be read
/// - The YAML/JSON cannot be parsed into a [`Config`]
///
/// Semantic validation (caps, hazard tables, rule shapes) happens later,
/// when the engine is constructed.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Config file not found at {}", path.display());
    }

    let config_content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: Config = if is_yaml(path) {
        serde_saphyr::from_str(&config_content)
            .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&config_content)
            .with_context(|| format!("Failed to parse config: invalid JSON in {}", path.display()))?
    };

    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}
