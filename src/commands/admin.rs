use crate::OutputFormat;
use crate::commands::summary::print_totals;
use crate::commands::{Backend, RangeArgs, last_day, print_json, require_admin};
use crate::config::Config;
use crate::settings::Settings;
use crate::timesheet::aggregate::{
    ChartBar, EmployeeStat, SortDirection, SortKey, Summary, format_duration, leaderboard_chart,
};
use crate::timesheet::models::Role;
use crate::timesheet::range::DateRange;
use crate::timesheet::view::OverallView;
use crate::utils::chart::render_leaderboard;
use crate::utils::truncate;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct LeaderboardReport<'a> {
    month: DateRange,
    summary: Summary,
    stats: &'a [EmployeeStat],
    chart: &'a [ChartBar],
}

pub fn leaderboard(
    config: &Config,
    settings: &Settings,
    range_args: &RangeArgs,
    key: SortKey,
    ascending: bool,
) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();
    require_admin(&ts, &backend.user_id)?;

    let (_, range) = range_args.resolve(settings.today(Utc::now()))?;
    let employees = ts.profiles().context("Failed to load employees")?;

    let mut view = OverallView::default();
    if !view.refresh(&ts, &range, settings.timezone) {
        anyhow::bail!("Failed to load shifts for all employees");
    }
    let month = view.month.unwrap_or_else(|| range.month_of_start());

    let direction = if ascending {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    };
    let stats = view.stats(&employees, settings.timezone, key, direction);
    let chart = leaderboard_chart(&stats);
    let totals = view.summary(settings.timezone);

    if settings.format == OutputFormat::Json {
        return print_json(&LeaderboardReport {
            month,
            summary: totals,
            stats: &stats,
            chart: &chart,
        });
    }

    println!(
        "Leaderboard {} to {} ({} employees)",
        month.start,
        last_day(&month),
        employees.len()
    );
    print_totals(&totals);
    println!();

    println!(
        "{:<4} {:<30} {:<10} {:<7} {:<5} {:<10}",
        "#", "Name", "Hours", "Shifts", "Days", "Avg/day"
    );
    println!("{}", "-".repeat(70));
    for (i, stat) in stats.iter().enumerate() {
        println!(
            "{:<4} {:<30} {:<10} {:<7} {:<5} {:<10}",
            i + 1,
            truncate(stat.profile.display_name(), 30),
            format_duration(stat.hours),
            stat.shifts,
            stat.days,
            format_duration(stat.avg_hours)
        );
    }

    if !chart.is_empty() {
        println!();
        println!("{}", render_leaderboard(&chart));
    }
    Ok(())
}

pub fn list_employees(config: &Config, settings: &Settings) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();
    require_admin(&ts, &backend.user_id)?;

    let employees = ts.profiles().context("Failed to load employees")?;

    if settings.format == OutputFormat::Json {
        return print_json(&employees);
    }

    if employees.is_empty() {
        println!("No employees found.");
        return Ok(());
    }

    println!("{:<38} {:<30} {:<9} {:<20}", "ID", "Name", "Role", "Avatar");
    println!("{}", "-".repeat(100));
    for p in &employees {
        println!(
            "{:<38} {:<30} {:<9} {:<20}",
            p.id,
            truncate(p.display_name(), 30),
            p.role,
            p.avatar_url.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub fn set_employee(
    config: &Config,
    id: &str,
    name: Option<String>,
    avatar: Option<String>,
    role: Option<Role>,
) -> Result<()> {
    let backend = Backend::connect(config)?;
    let ts = backend.timesheet();
    require_admin(&ts, &backend.user_id)?;

    let mut profile = ts
        .profile(id)
        .context("Failed to load profile")?
        .with_context(|| format!("No profile found for {}", id))?;

    if let Some(name) = name {
        profile.full_name = Some(name);
    }
    if let Some(avatar) = avatar {
        profile.avatar_url = Some(avatar).filter(|a| !a.is_empty());
    }
    if let Some(role) = role {
        profile.role = role;
    }

    let saved = ts
        .update_profile(&profile)
        .context("Failed to update profile")?;
    println!(
        "✓ Updated {} ({}, {})",
        saved.id,
        saved.display_name(),
        saved.role
    );
    Ok(())
}
