use crate::OutputFormat;
use crate::commands::{Backend, RangeArgs, last_day, print_json, target_user};
use crate::config::Config;
use crate::settings::Settings;
use crate::timesheet::aggregate::{
    DayBucket, Summary, bucket_by_day, format_duration, shift_duration_hours, summarize,
};
use crate::timesheet::models::{DailyNote, ShiftEntry};
use crate::timesheet::range::{DateRange, month_range};
use crate::timesheet::view::EmployeeView;
use crate::utils::chart::render_days;
use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SummaryReport<'a> {
    user_id: &'a str,
    label: String,
    range: DateRange,
    summary: Summary,
    entries: &'a [ShiftEntry],
    notes: &'a [DailyNote],
}

pub fn summary(
    config: &Config,
    settings: &Settings,
    range_args: &RangeArgs,
    user: Option<&str>,
) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();
    let user_id = target_user(&ts, &backend.user_id, user)?;

    let (preset, range) = range_args.resolve(settings.today(Utc::now()))?;

    let mut view = EmployeeView::new(&user_id);
    if !view.refresh(&ts, &range, settings.timezone) {
        anyhow::bail!("Failed to load timesheet for {}", user_id);
    }
    let entries = view.entries_in(&range, settings.timezone);
    let totals = summarize(&entries, settings.timezone);

    if settings.format == OutputFormat::Json {
        return print_json(&SummaryReport {
            user_id: &user_id,
            label: preset.label(),
            range,
            summary: totals,
            entries: &entries,
            notes: &view.notes,
        });
    }

    println!(
        "{} ({} to {}) for {}",
        preset.label(),
        range.start,
        last_day(&range),
        user_id
    );
    print_totals(&totals);

    if let Some(active) = &view.active_shift {
        println!("Shift in progress since {}", settings.local(active.start_time));
    }

    if entries.is_empty() {
        println!("\nNo shifts in this range.");
        return Ok(());
    }

    println!();
    println!(
        "{:<8} {:<17} {:<17} {:<10} {:<4}",
        "ID", "Start", "End", "Duration", "Note"
    );
    println!("{}", "-".repeat(60));
    for entry in &entries {
        let date = entry.start_time.with_timezone(&settings.timezone).date_naive();
        println!(
            "{:<8} {:<17} {:<17} {:<10} {:<4}",
            entry.id,
            settings.local(entry.start_time),
            entry
                .end_time
                .map(|t| settings.local(t))
                .unwrap_or_else(|| "(open)".to_string()),
            format_duration(shift_duration_hours(entry)),
            if view.note_on(date).is_some() { "yes" } else { "" }
        );
    }

    Ok(())
}

pub fn print_totals(totals: &Summary) {
    println!("  Total hours:   {}", format_duration(totals.total_hours));
    println!("  Work days:     {}", totals.total_work_days);
    println!("  Shifts:        {}", totals.total_shifts);
    println!(
        "  Avg per day:   {}",
        format_duration(totals.average_hours_per_day)
    );
}

#[derive(Debug, Serialize)]
struct ChartReport<'a> {
    user_id: &'a str,
    year: i32,
    month: u32,
    days: &'a [DayBucket],
}

pub fn chart(
    config: &Config,
    settings: &Settings,
    year: Option<i32>,
    month: Option<u32>,
    user: Option<&str>,
) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();
    let user_id = target_user(&ts, &backend.user_id, user)?;

    let today = settings.today(Utc::now());
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());
    let range = month_range(year, month)
        .with_context(|| format!("Invalid month: {}-{:02}", year, month))?;

    let mut view = EmployeeView::new(&user_id);
    if !view.refresh(&ts, &range, settings.timezone) {
        anyhow::bail!("Failed to load timesheet for {}", user_id);
    }
    let days = bucket_by_day(&view.entries, year, month, settings.timezone);

    if settings.format == OutputFormat::Json {
        return print_json(&ChartReport {
            user_id: &user_id,
            year,
            month,
            days: &days,
        });
    }

    println!("Daily hours {}-{:02} for {}", year, month, user_id);
    println!("{}", render_days(&days));
    Ok(())
}
