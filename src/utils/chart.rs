//! Horizontal text bar charts for daily hours and the leaderboard.

use crate::timesheet::aggregate::{ChartBar, DayBucket, format_duration};

const BAR_WIDTH: usize = 40;

/// Number of `#` cells for `value` when `max` fills the full width.
pub fn bar_len(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    let len = (value / max * width as f64).round() as usize;
    len.clamp(1, width)
}

fn bar_line(label: &str, label_width: usize, hours: f64, max: f64) -> String {
    format!(
        "{:>label_width$} | {:<bar_width$} {}",
        label,
        "#".repeat(bar_len(hours, max, BAR_WIDTH)),
        format_duration(hours),
        label_width = label_width,
        bar_width = BAR_WIDTH,
    )
}

/// One row per day of the month; empty days keep their row.
pub fn render_days(buckets: &[DayBucket]) -> String {
    let max = buckets.iter().map(|b| b.total_hours).fold(0.0, f64::max);

    buckets
        .iter()
        .map(|b| bar_line(&format!("{:02}", b.day), 2, b.total_hours, max))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_leaderboard(bars: &[ChartBar]) -> String {
    let max = bars.iter().map(|b| b.hours).fold(0.0, f64::max);
    let label_width = bars
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);

    bars.iter()
        .map(|b| {
            let label = format!("{}. {}", b.position, super::truncate(&b.label, label_width));
            bar_line(&label, label_width + 4, b.hours, max)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
