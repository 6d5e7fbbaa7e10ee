use shiftboard::config::{Config, load_from_path, save_to_path};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_valid() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let config_content = r#"
        [store]
        url = "https://proj.example.co"
        api_key = "anon-key"
        attachments_bucket = "team_files"

        [session]
        user_id = "u-1"

        [display]
        timezone = "Europe/Berlin"
    "#;
    temp_file.write_all(config_content.as_bytes()).unwrap();

    let config = load_from_path(temp_file.path()).expect("Failed to load valid config");

    assert_eq!(config.store.url, "https://proj.example.co");
    assert_eq!(config.store.attachments_bucket, "team_files");
    assert_eq!(config.user_id().unwrap(), "u-1");
    assert_eq!(config.get_api_key().unwrap(), "anon-key");
    assert_eq!(config.display.tz().unwrap(), chrono_tz::Europe::Berlin);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_config_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"").unwrap();

    let config = load_from_path(temp_file.path()).expect("Empty config falls back to defaults");

    assert_eq!(config.display.timezone, "Asia/Ho_Chi_Minh");
    assert_eq!(config.store.attachments_bucket, "daily_attachments");
    assert!(!config.store.use_keyring);
    assert!(config.user_id().is_err(), "no signed-in user yet");
    assert!(config.get_api_key().is_err());
}

#[test]
fn test_invalid_timezone_fails_validation() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[display]\ntimezone = \"Asia/Atlantis\"\n")
        .unwrap();

    let config = load_from_path(temp_file.path()).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Asia/Atlantis"));
}

#[test]
fn test_non_http_store_url_fails_validation() {
    let mut config = Config::default();
    config.store.url = "ftp://proj.example.co".to_string();
    assert!(config.validate().is_err());

    config.store.url = "http://localhost:54321".to_string();
    assert!(config.validate().is_ok());

    config.store.attachments_bucket = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_migration_is_off_without_keyring() {
    let mut config = Config::default();
    config.store.api_key = Some("anon-key".to_string());

    assert!(!config.migrate_credentials().unwrap());
    assert_eq!(config.store.api_key.as_deref(), Some("anon-key"));
}

#[test]
fn test_api_key_comes_from_file_without_keyring() {
    let mut config = Config::default();
    config.store.url = "https://proj.example.co".to_string();
    config.store.api_key = Some("anon-key".to_string());

    assert!(!config.store.use_keyring);
    assert_eq!(config.get_api_key().unwrap(), "anon-key");
}

#[test]
fn test_missing_api_key_without_keyring() {
    let mut config = Config::default();
    config.store.url = "https://proj.example.co".to_string();

    let result = config.get_api_key();
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Store API key not found")
    );
}

#[test]
fn test_save_and_reload() {
    let temp_file = NamedTempFile::new().unwrap();
    let mut config = Config::default();
    config.store.url = "https://proj.example.co".to_string();
    config.session.user_id = "u-9".to_string();

    save_to_path(&config, temp_file.path()).unwrap();
    let reloaded = load_from_path(temp_file.path()).unwrap();

    assert_eq!(reloaded.store.url, "https://proj.example.co");
    assert_eq!(reloaded.session.user_id, "u-9");
    assert_eq!(reloaded.display.timezone, "Asia/Ho_Chi_Minh");
}
