use crate::config::Config;
use anyhow::{Context, Result};

const MASK: &str = "********";

/// Copy of the config safe to print: secrets are masked.
fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    if shown.store.api_key.is_some() {
        shown.store.api_key = Some(MASK.to_string());
    }
    if shown.store.access_token.is_some() {
        shown.store.access_token = Some(MASK.to_string());
    }
    shown
}

pub fn list(config: &Config) -> Result<()> {
    let toml_str =
        toml::to_string_pretty(&redacted(config)).context("Failed to serialize config")?;
    println!("{}", toml_str);
    Ok(())
}

/// Look up a dotted key such as `display.timezone`.
pub fn lookup(config: &Config, key: &str) -> Result<String> {
    let value = serde_json::to_value(redacted(config)).context("Failed to serialize config")?;

    let mut current = &value;
    for part in key.split('.') {
        current = current
            .get(part)
            .with_context(|| format!("Key not found: {}", key))?;
    }

    Ok(match current {
        serde_json::Value::String(s) => s.clone(),
        v => v.to_string(),
    })
}

pub fn get(key: &str, config: &Config) -> Result<()> {
    println!("{}", lookup(config, key)?);
    Ok(())
}
