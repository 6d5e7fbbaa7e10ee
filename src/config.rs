use crate::platform;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config as ConfigBuilder, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    /// Project URL, e.g. https://xyz.supabase.co
    pub url: String,
    pub api_key: Option<String>, // Can be optional if loading from keyring
    /// Signed-in user's token; the API key is sent when absent
    pub access_token: Option<String>,
    #[serde(default = "default_bucket")]
    pub attachments_bucket: String,
    /// Keep the API key in the OS keyring instead of this file
    #[serde(default)]
    pub use_keyring: bool,
}

fn default_bucket() -> String {
    "daily_attachments".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            access_token: None,
            attachments_bucket: default_bucket(),
            use_keyring: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SessionConfig {
    /// Authenticated user id; profile and shift rows are keyed on it
    pub user_id: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "Asia/Ho_Chi_Minh".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl DisplayConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", self.timezone, e))
    }

    pub fn validate(&self) -> Result<()> {
        self.tz().map(|_| ())
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Ok(()); // Not configured yet; commands fail later with a hint
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            anyhow::bail!("Store URL '{}' must start with http:// or https://", self.url);
        }
        if self.attachments_bucket.trim().is_empty() {
            anyhow::bail!("attachments_bucket must not be empty");
        }
        Ok(())
    }
}

impl Config {
    /// Get the store API key from keyring or config (with migration)
    pub fn get_api_key(&self) -> Result<String> {
        if self.store.use_keyring {
            match crate::keyring::get_api_key(&self.store.url) {
                Ok(Some(key)) => return Ok(key),
                Ok(None) => {}
                Err(e) => log::warn!("{:#}", e),
            }
        }

        if let Some(key) = &self.store.api_key {
            return Ok(key.clone());
        }

        anyhow::bail!(
            "Store API key not found. Add api_key under [store] in ~/.shiftboard/config.toml"
        )
    }

    pub fn user_id(&self) -> Result<&str> {
        if self.session.user_id.is_empty() {
            anyhow::bail!("No signed-in user. Set user_id under [session] in config.toml");
        }
        Ok(&self.session.user_id)
    }

    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;
        self.display.validate()?;
        Ok(())
    }

    /// Move a plain-text API key into the keyring
    pub fn migrate_credentials(&mut self) -> Result<bool> {
        let mut migrated = false;

        if !self.store.use_keyring {
            return Ok(false);
        }

        if let Some(key) = &self.store.api_key {
            crate::keyring::store_api_key(&self.store.url, key)?;
            self.store.api_key = None;
            migrated = true;
        }

        Ok(migrated)
    }
}

pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
    let loader = ConfigBuilder::builder()
        .add_source(File::from(path.as_ref()).format(FileFormat::Toml))
        .build()
        .context("Failed to build config loader")?;

    loader
        .try_deserialize()
        .context("Failed to parse config file")
}

pub fn load() -> Result<Config> {
    let config_path = platform::config_path(None)?;
    if !config_path.exists() {
        log::warn!("No config at {}, using defaults", config_path.display());
        return Ok(Config::default());
    }

    let mut config = load_from_path(&config_path)?;
    config.validate()?;

    if config.migrate_credentials()? {
        log::info!("Migrated store API key to secure storage.");
        if let Some(dir) = config_path.parent() {
            platform::ensure_writable(dir)?;
        }
        save_to_path(&config, &config_path)?;
    }

    Ok(config)
}

pub fn save_to_path<P: AsRef<Path>>(config: &Config, path: P) -> Result<()> {
    let toml_string = toml::to_string_pretty(config).context("Failed to serialize config")?;

    std::fs::write(path.as_ref(), toml_string).context("Failed to write config file")?;

    Ok(())
}
