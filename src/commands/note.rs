use crate::commands::{Backend, target_user};
use crate::config::Config;
use crate::settings::Settings;
use crate::timesheet::repo::Attachment;
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::path::Path;

fn parse_date(date: Option<&str>, settings: &Settings) -> Result<NaiveDate> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", d)),
        None => Ok(settings.today(Utc::now())),
    }
}

/// MIME type from the file extension; unknown types upload as octet-stream.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read attachment {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Attachment path has no file name")?
        .to_string();

    Ok(Attachment {
        file_name,
        content_type: content_type_for(path).to_string(),
        bytes,
    })
}

pub fn show(
    config: &Config,
    settings: &Settings,
    date: Option<&str>,
    user: Option<&str>,
) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();
    let user_id = target_user(&ts, &backend.user_id, user)?;
    let date = parse_date(date, settings)?;

    let Some(note) = ts
        .note_for_day(&user_id, date)
        .context("Failed to load daily note")?
    else {
        println!("No note for {}.", date);
        return Ok(());
    };

    println!("Note for {}:", note.date);
    println!("{}", note.note.as_deref().unwrap_or("(empty)"));
    if let Some(url) = &note.file_url {
        println!("Attachment: {}", url);
    }
    Ok(())
}

pub fn save(
    config: &Config,
    settings: &Settings,
    date: Option<&str>,
    text: Option<&str>,
    attach: Option<&Path>,
    remove_attachment: bool,
) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();
    let date = parse_date(date, settings)?;

    let attachment = attach.map(read_attachment).transpose()?;
    let existing = ts
        .note_for_day(&backend.user_id, date)
        .context("Failed to load daily note")?;

    // Keep the current text when only the attachment changes
    let text = match text {
        Some(t) => t.to_string(),
        None => existing
            .as_ref()
            .and_then(|n| n.note.clone())
            .unwrap_or_default(),
    };

    let note = ts
        .save_note(
            &backend.user_id,
            date,
            &text,
            attachment,
            remove_attachment,
            existing.as_ref(),
            Utc::now(),
        )
        .context("Failed to save daily note")?;

    println!("✓ Saved note for {}", note.date);
    if let Some(url) = &note.file_url {
        println!("  Attachment: {}", url);
    }
    Ok(())
}

pub fn delete(config: &Config, settings: &Settings, date: Option<&str>) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();
    let date = parse_date(date, settings)?;

    let Some(note) = ts
        .note_for_day(&backend.user_id, date)
        .context("Failed to load daily note")?
    else {
        println!("No note for {}.", date);
        return Ok(());
    };

    ts.delete_note(&note).context("Failed to delete daily note")?;
    println!("✓ Deleted note for {}", date);
    Ok(())
}
