use crate::commands::{Backend, require_admin, target_user};
use crate::config::Config;
use crate::settings::Settings;
use crate::timesheet::aggregate::{elapsed_hours, format_duration, shift_duration_hours};
use crate::timesheet::entry_form::EntryForm;
use crate::timesheet::models::ShiftEntry;
use crate::timesheet::repo::Timesheet;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use std::io::{self, Write};
use std::time::Duration;

pub fn start(config: &Config, settings: &Settings) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();

    if let Some(open) = ts
        .open_shift(&backend.user_id)
        .context("Failed to check for an open shift")?
    {
        anyhow::bail!(
            "Shift {} is already running since {}. End it first with 'shiftboard shift end'",
            open.id,
            settings.local(open.start_time)
        );
    }

    let entry = ts
        .start_shift(&backend.user_id, Utc::now())
        .context("Failed to start shift")?;
    println!("✓ Shift {} started at {}", entry.id, settings.local(entry.start_time));
    Ok(())
}

pub fn end(config: &Config, settings: &Settings) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();

    let Some(open) = ts
        .open_shift(&backend.user_id)
        .context("Failed to check for an open shift")?
    else {
        println!("No open shift.");
        return Ok(());
    };

    let entry = ts
        .end_shift(open.id, Utc::now())
        .context("Failed to end shift")?;
    println!(
        "✓ Shift {} ended at {} ({})",
        entry.id,
        entry.end_time.map(|t| settings.local(t)).unwrap_or_default(),
        format_duration(shift_duration_hours(&entry))
    );
    Ok(())
}

/// `HH:MM:SS` for the running timer.
pub fn format_clock(hours: f64) -> String {
    let secs = (hours * 3600.0).floor().max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

pub fn current(config: &Config, settings: &Settings, watch: bool) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();

    let Some(open) = ts
        .open_shift(&backend.user_id)
        .context("Failed to check for an open shift")?
    else {
        println!("No open shift.");
        return Ok(());
    };

    println!("Active Shift:");
    println!("  ID: {}", open.id);
    println!("  Started: {}", settings.local(open.start_time));

    if !watch {
        println!("  Elapsed: {}", format_clock(elapsed_hours(&open, Utc::now())));
        return Ok(());
    }

    // Redraws locally; the store is not polled again
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "\r  Elapsed: {}", format_clock(elapsed_hours(&open, Utc::now())))?;
        stdout.flush()?;
        std::thread::sleep(Duration::from_secs(1));
    }
}

/// Load an entry and check that the signed-in user may change it.
fn owned_entry(ts: &Timesheet<'_>, user_id: &str, id: i64) -> Result<ShiftEntry> {
    let entry = ts
        .entry(id)
        .context("Failed to load shift")?
        .with_context(|| format!("Shift {} not found", id))?;

    if entry.user_id != user_id {
        require_admin(ts, user_id)?;
    }
    Ok(entry)
}

/// Manual entry fields; unset ones keep the form's current value.
#[derive(Args, Debug, Default)]
pub struct FormArgs {
    #[arg(long, help = "Date YYYY-MM-DD (add default: today)")]
    pub date: Option<String>,
    #[arg(long, help = "Start time HH:MM (add default: 09:00)")]
    pub start: Option<String>,
    #[arg(long, help = "End time HH:MM (add default: 17:00)")]
    pub end: Option<String>,
    #[arg(long, conflicts_with = "end", help = "Leave the shift open / clear its end time")]
    pub open: bool,
}

impl FormArgs {
    fn apply(&self, form: &mut EntryForm) {
        if let Some(date) = &self.date {
            form.date = date.clone();
        }
        if let Some(start) = &self.start {
            form.start = start.clone();
        }
        if self.open {
            form.end = None;
        } else if let Some(end) = &self.end {
            form.end = Some(end.clone());
        }
    }
}

pub fn add(config: &Config, settings: &Settings, args: &FormArgs, user: Option<&str>) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();
    let user_id = target_user(&ts, &backend.user_id, user)?;

    let mut form = EntryForm::new_for(settings.today(Utc::now()));
    args.apply(&mut form);

    let Some(draft) = form.to_draft(&user_id, None, settings.timezone) else {
        log::warn!("Rejected manual entry {:?}", form);
        println!("Invalid date or start time (expected YYYY-MM-DD and HH:MM). Nothing saved.");
        return Ok(());
    };

    let entry = ts.save_entry(&draft).context("Failed to save shift")?;
    print_saved("Added", &entry, settings);
    Ok(())
}

pub fn edit(config: &Config, settings: &Settings, id: i64, args: &FormArgs) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();
    let existing = owned_entry(&ts, &backend.user_id, id)?;

    let mut form = EntryForm::from_entry(existing.start_time, existing.end_time, settings.timezone);
    args.apply(&mut form);

    let Some(draft) = form.to_draft(&existing.user_id, Some(id), settings.timezone) else {
        log::warn!("Rejected edit of shift {}: {:?}", id, form);
        println!("Invalid date or start time (expected YYYY-MM-DD and HH:MM). Nothing saved.");
        return Ok(());
    };

    let entry = ts.save_entry(&draft).context("Failed to update shift")?;
    print_saved("Updated", &entry, settings);
    Ok(())
}

pub fn delete(config: &Config, id: i64) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();
    owned_entry(&ts, &backend.user_id, id)?;

    ts.delete_entry(id).context("Failed to delete shift")?;
    println!("✓ Deleted shift {}", id);
    Ok(())
}

fn print_saved(verb: &str, entry: &ShiftEntry, settings: &Settings) {
    match entry.end_time {
        Some(end) => println!(
            "✓ {} shift {}: {} → {} ({})",
            verb,
            entry.id,
            settings.local(entry.start_time),
            settings.local(end),
            format_duration(shift_duration_hours(entry))
        ),
        None => println!(
            "✓ {} shift {}: {} → (open)",
            verb,
            entry.id,
            settings.local(entry.start_time)
        ),
    }
}
