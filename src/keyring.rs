//! Store API keys kept in the OS keyring, one entry per backend URL.

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE: &str = "shiftboard-store";

fn entry_for(store_url: &str) -> Result<Entry> {
    Entry::new(SERVICE, store_url.trim_end_matches('/'))
        .with_context(|| format!("Failed to open keyring entry for {}", store_url))
}

pub fn store_api_key(store_url: &str, key: &str) -> Result<()> {
    entry_for(store_url)?
        .set_password(key)
        .context("Failed to store API key in keyring")
}

/// `Ok(None)` when the keyring has no key for this backend yet.
pub fn get_api_key(store_url: &str) -> Result<Option<String>> {
    match entry_for(store_url)?.get_password() {
        Ok(key) => Ok(Some(key)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e).context("Failed to read API key from keyring"),
    }
}
