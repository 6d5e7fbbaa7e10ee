use crate::OutputFormat;
use crate::commands::{Backend, print_json};
use crate::config::Config;
use crate::settings::Settings;
use anyhow::{Context, Result};

pub fn show(config: &Config, settings: &Settings) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();

    let profile = ts
        .profile(&backend.user_id)
        .context("Failed to load profile")?;

    if settings.format == OutputFormat::Json {
        return print_json(&profile);
    }

    let Some(profile) = profile else {
        println!("No profile yet for {}.", backend.user_id);
        return Ok(());
    };

    println!("Profile:");
    println!("  ID: {}", profile.id);
    println!("  Name: {}", profile.display_name());
    println!("  Role: {}", profile.role);
    if let Some(avatar) = &profile.avatar_url {
        println!("  Avatar: {}", avatar);
    }
    if let Some(updated) = profile.updated_at {
        println!("  Updated: {}", settings.local(updated));
    }
    Ok(())
}
