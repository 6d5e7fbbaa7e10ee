//! Cross-platform resolution of the configuration directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".shiftboard";

/// Get the configuration directory.
///
/// Priority order:
/// 1. Explicit override (for testing/CI)
/// 2. Home directory (~/.shiftboard)
/// 3. Platform config directory (XDG on Linux, AppData on Windows)
pub fn config_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }

    if let Some(home) = home::home_dir() {
        return Ok(home.join(APP_DIR));
    }

    // - Linux: ~/.config/shiftboard
    // - macOS: ~/Library/Application Support/shiftboard
    // - Windows: C:\Users\<User>\AppData\Roaming\shiftboard
    dirs::config_dir()
        .map(|d| d.join("shiftboard"))
        .context("Could not find a home or config directory")
}

/// Path of `config.toml` inside the configuration directory.
pub fn config_path(override_dir: Option<&Path>) -> Result<PathBuf> {
    Ok(config_dir(override_dir)?.join("config.toml"))
}

/// Ensure a directory exists and is writable by the current user.
pub fn ensure_writable(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let test_path = dir.join(".write_test");
    fs::write(&test_path, b"test")
        .with_context(|| format!("Directory {} is not writable", dir.display()))?;

    // Cleanup can fail on Windows while antivirus holds the file
    let _ = fs::remove_file(&test_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_dir_takes_priority() {
        let temp = TempDir::new().unwrap();
        let dir = config_dir(Some(temp.path())).unwrap();
        assert_eq!(dir, temp.path());
        assert_eq!(
            config_path(Some(temp.path())).unwrap(),
            temp.path().join("config.toml")
        );
    }

    #[test]
    fn test_ensure_writable_creates_dir() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");

        assert!(ensure_writable(&nested).is_ok());
        assert!(nested.exists());
        assert!(!nested.join(".write_test").exists());
    }
}
