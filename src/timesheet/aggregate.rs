//! Duration arithmetic over in-memory shift lists.
//!
//! Everything here is pure and total: malformed spans degrade to zero rather
//! than failing, and entries outside the requested month or belonging to
//! unknown employees are skipped without notice.

use crate::timesheet::models::{EmployeeProfile, ShiftEntry};
use crate::timesheet::range::{civil_date, days_in_month};
use chrono::{DateTime, Datelike, Utc};
use clap::ValueEnum;
use chrono_tz::Tz;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// `(end - start)` in hours; 0 for open shifts and for end < start.
pub fn shift_duration_hours(entry: &ShiftEntry) -> f64 {
    match entry.end_time {
        Some(end) => span_hours(entry.start_time, end),
        None => 0.0,
    }
}

/// Running time of an open shift at `now`, for the live timer.
pub fn elapsed_hours(entry: &ShiftEntry, now: DateTime<Utc>) -> f64 {
    span_hours(entry.start_time, entry.end_time.unwrap_or(now))
}

fn span_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let span = end - start;
    // Microseconds overflow only past ~292k years
    let micros = span
        .num_microseconds()
        .unwrap_or_else(|| span.num_milliseconds().saturating_mul(1_000));
    if micros < 0 {
        return 0.0;
    }
    micros as f64 / 3_600_000_000.0
}

/// First entry without an end time.
pub fn active_shift(entries: &[ShiftEntry]) -> Option<&ShiftEntry> {
    entries.iter().find(|e| e.is_open())
}

/// `"{h}h {m}m"` from the floored minute count.
pub fn format_duration(hours: f64) -> String {
    let total_minutes = (hours * 60.0).floor().max(0.0) as u64;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub total_hours: f64,
    pub total_work_days: usize,
    pub total_shifts: usize,
    pub average_hours_per_day: f64,
}

/// Totals over closed entries; work days are distinct civil start dates.
pub fn summarize(entries: &[ShiftEntry], tz: Tz) -> Summary {
    let closed: Vec<&ShiftEntry> = entries.iter().filter(|e| !e.is_open()).collect();

    let total_hours: f64 = closed.iter().map(|e| shift_duration_hours(e)).sum();
    let days: HashSet<_> = closed
        .iter()
        .map(|e| civil_date(e.start_time, tz))
        .collect();
    let total_work_days = days.len();

    Summary {
        total_hours,
        total_work_days,
        total_shifts: closed.len(),
        average_hours_per_day: if total_work_days > 0 {
            total_hours / total_work_days as f64
        } else {
            0.0
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    pub day: u32,
    pub total_hours: f64,
    pub entries: Vec<ShiftEntry>,
}

/// One bucket per day of the month, keyed by the civil date of each start.
pub fn bucket_by_day(entries: &[ShiftEntry], year: i32, month: u32, tz: Tz) -> Vec<DayBucket> {
    let mut buckets: Vec<DayBucket> = (1..=days_in_month(year, month))
        .map(|day| DayBucket {
            day,
            total_hours: 0.0,
            entries: Vec::new(),
        })
        .collect();

    for entry in entries {
        let date = civil_date(entry.start_time, tz);
        if date.year() != year || date.month() != month {
            continue;
        }
        if let Some(bucket) = buckets.get_mut(date.day0() as usize) {
            bucket.total_hours += shift_duration_hours(entry);
            bucket.entries.push(entry.clone());
        }
    }

    buckets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    #[default]
    Hours,
    Shifts,
    Days,
    Average,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeStat {
    pub profile: EmployeeProfile,
    pub hours: f64,
    pub shifts: usize,
    pub days: usize,
    pub avg_hours: f64,
}

/// Leaderboard rows, one per employee, in a stable sort on `key`.
///
/// Only closed entries with a positive duration count toward a row.
pub fn bucket_by_employee(
    entries: &[ShiftEntry],
    employees: &[EmployeeProfile],
    tz: Tz,
    key: SortKey,
    direction: SortDirection,
) -> Vec<EmployeeStat> {
    struct Acc {
        hours: f64,
        shifts: usize,
        days: HashSet<chrono::NaiveDate>,
    }

    let mut acc: HashMap<&str, Acc> = employees
        .iter()
        .map(|p| {
            (
                p.id.as_str(),
                Acc {
                    hours: 0.0,
                    shifts: 0,
                    days: HashSet::new(),
                },
            )
        })
        .collect();

    for entry in entries.iter().filter(|e| !e.is_open()) {
        let Some(stat) = acc.get_mut(entry.user_id.as_str()) else {
            continue;
        };
        let hours = shift_duration_hours(entry);
        if hours > 0.0 {
            stat.hours += hours;
            stat.shifts += 1;
            stat.days.insert(civil_date(entry.start_time, tz));
        }
    }

    let mut stats: Vec<EmployeeStat> = employees
        .iter()
        .map(|p| {
            let (hours, shifts, days) = acc
                .get(p.id.as_str())
                .map(|a| (a.hours, a.shifts, a.days.len()))
                .unwrap_or_default();
            EmployeeStat {
                profile: p.clone(),
                hours,
                shifts,
                days,
                avg_hours: if days > 0 { hours / days as f64 } else { 0.0 },
            }
        })
        .collect();

    sort_stats(&mut stats, key, direction);
    stats
}

/// Stable: rows comparing equal keep their current order in both directions.
pub fn sort_stats(stats: &mut [EmployeeStat], key: SortKey, direction: SortDirection) {
    stats.sort_by(|a, b| {
        let ord = compare_by(a, b, key);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn compare_by(a: &EmployeeStat, b: &EmployeeStat, key: SortKey) -> Ordering {
    let float = |x: f64, y: f64| x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    match key {
        SortKey::Name => a
            .profile
            .full_name
            .as_deref()
            .unwrap_or("")
            .cmp(b.profile.full_name.as_deref().unwrap_or("")),
        SortKey::Hours => float(a.hours, b.hours),
        SortKey::Shifts => a.shifts.cmp(&b.shifts),
        SortKey::Days => a.days.cmp(&b.days),
        SortKey::Average => float(a.avg_hours, b.avg_hours),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub position: usize,
    pub label: String,
    pub hours: f64,
}

/// Bars for employees with recorded hours, most hours first, labelled by last name.
pub fn leaderboard_chart(stats: &[EmployeeStat]) -> Vec<ChartBar> {
    let mut ranked: Vec<&EmployeeStat> = stats.iter().filter(|s| s.hours > 0.0).collect();
    ranked.sort_by(|a, b| b.hours.partial_cmp(&a.hours).unwrap_or(Ordering::Equal));

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, s)| ChartBar {
            position: i + 1,
            label: s
                .profile
                .full_name
                .as_deref()
                .and_then(|n| n.split_whitespace().last())
                .map(str::to_string)
                .unwrap_or_else(|| s.profile.id.clone()),
            hours: s.hours,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timesheet::models::Role;
    use chrono::TimeZone;
    use chrono_tz::Asia::Ho_Chi_Minh;
    use chrono_tz::UTC;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn entry(id: i64, user: &str, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> ShiftEntry {
        ShiftEntry {
            id,
            user_id: user.to_string(),
            start_time: start,
            end_time: end,
            created_at: None,
        }
    }

    fn profile(id: &str, name: &str) -> EmployeeProfile {
        EmployeeProfile {
            id: id.to_string(),
            full_name: Some(name.to_string()),
            avatar_url: None,
            role: Role::Employee,
            updated_at: None,
        }
    }

    #[test]
    fn test_negative_span_counts_as_zero() {
        let e = entry(1, "u", at(2026, 3, 2, 10, 0), Some(at(2026, 3, 2, 9, 0)));
        assert_eq!(shift_duration_hours(&e), 0.0);
    }

    #[test]
    fn test_duration_is_exact_hours() {
        let e = entry(1, "u", at(2026, 3, 2, 8, 0), Some(at(2026, 3, 2, 9, 30)));
        assert_eq!(shift_duration_hours(&e), 1.5);

        let open = entry(2, "u", at(2026, 3, 2, 8, 0), None);
        assert_eq!(shift_duration_hours(&open), 0.0);
    }

    #[test]
    fn test_duration_keeps_microseconds() {
        let start: DateTime<Utc> = "2026-03-02T08:00:00Z".parse().unwrap();
        let end: DateTime<Utc> = "2026-03-02T08:00:00.000900Z".parse().unwrap();
        let e = entry(1, "u", start, Some(end));

        assert_eq!(shift_duration_hours(&e), 900.0 / 3_600_000_000.0);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[], UTC), Summary::default());
    }

    #[test]
    fn test_summarize_two_shifts_same_day() {
        let entries = vec![
            entry(1, "u", at(2026, 3, 2, 1, 0), Some(at(2026, 3, 2, 4, 0))),
            entry(2, "u", at(2026, 3, 2, 5, 0), Some(at(2026, 3, 2, 9, 0))),
        ];
        let s = summarize(&entries, Ho_Chi_Minh);
        assert_eq!(s.total_hours, 7.0);
        assert_eq!(s.total_work_days, 1);
        assert_eq!(s.total_shifts, 2);
        assert_eq!(s.average_hours_per_day, 7.0);
    }

    #[test]
    fn test_summarize_ignores_open_shift_and_uses_civil_days() {
        // 18:00Z and 23:00Z on the 1st fall on the 2nd in UTC+7; 10:00Z stays on the 1st
        let entries = vec![
            entry(1, "u", at(2026, 3, 1, 10, 0), Some(at(2026, 3, 1, 12, 0))),
            entry(2, "u", at(2026, 3, 1, 18, 0), Some(at(2026, 3, 1, 20, 0))),
            entry(3, "u", at(2026, 3, 1, 23, 0), None),
        ];
        let s = summarize(&entries, Ho_Chi_Minh);
        assert_eq!(s.total_shifts, 2);
        assert_eq!(s.total_work_days, 2);
        assert_eq!(s.total_hours, 4.0);
        assert_eq!(s.average_hours_per_day, 2.0);
    }

    #[test]
    fn test_summarize_counts_zeroed_negative_shift() {
        // silent-zero: the malformed span still counts as a shift and a day
        let entries = vec![entry(1, "u", at(2026, 3, 2, 10, 0), Some(at(2026, 3, 2, 9, 0)))];
        let s = summarize(&entries, UTC);
        assert_eq!(s.total_shifts, 1);
        assert_eq!(s.total_work_days, 1);
        assert_eq!(s.total_hours, 0.0);
    }

    #[test]
    fn test_bucket_by_day_single_entry() {
        let entries = vec![entry(1, "u", at(2026, 4, 15, 2, 0), Some(at(2026, 4, 15, 4, 0)))];
        let buckets = bucket_by_day(&entries, 2026, 4, Ho_Chi_Minh);

        assert_eq!(buckets.len(), 30);
        for (i, b) in buckets.iter().enumerate() {
            let expected = if i == 14 { 2.0 } else { 0.0 };
            assert_eq!(b.total_hours, expected, "day {}", b.day);
        }
        assert_eq!(buckets[14].entries.len(), 1);
    }

    #[test]
    fn test_bucket_by_day_skips_other_months() {
        // silent-skip: March 31 17:00Z is April 1 in UTC+7
        let entries = vec![
            entry(1, "u", at(2026, 3, 31, 17, 0), Some(at(2026, 3, 31, 19, 0))),
            entry(2, "u", at(2026, 5, 1, 2, 0), Some(at(2026, 5, 1, 3, 0))),
        ];
        let march = bucket_by_day(&entries, 2026, 3, Ho_Chi_Minh);
        assert!(march.iter().all(|b| b.total_hours == 0.0));

        let april = bucket_by_day(&entries, 2026, 4, Ho_Chi_Minh);
        assert_eq!(april[0].total_hours, 2.0);
    }

    #[test]
    fn test_bucket_by_day_invalid_month_is_empty() {
        assert!(bucket_by_day(&[], 2026, 13, UTC).is_empty());
    }

    #[test]
    fn test_leaderboard_hours_desc_puts_idle_employee_last() {
        let employees = vec![
            profile("idle", "Tran Thi Idle"),
            profile("a", "Le Van A"),
            profile("b", "Pham Thi B"),
        ];
        let entries = vec![
            entry(1, "a", at(2026, 3, 2, 1, 0), Some(at(2026, 3, 2, 3, 0))),
            entry(2, "b", at(2026, 3, 2, 1, 0), Some(at(2026, 3, 2, 6, 0))),
            entry(3, "b", at(2026, 3, 3, 1, 0), Some(at(2026, 3, 3, 2, 0))),
        ];

        let stats = bucket_by_employee(
            &entries,
            &employees,
            UTC,
            SortKey::Hours,
            SortDirection::Desc,
        );

        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].profile.id, "b");
        assert_eq!(stats[0].hours, 6.0);
        assert_eq!(stats[0].shifts, 2);
        assert_eq!(stats[0].days, 2);
        assert_eq!(stats[0].avg_hours, 3.0);
        assert_eq!(stats[1].profile.id, "a");
        assert_eq!(stats[2].profile.id, "idle");
        assert_eq!(stats[2].hours, 0.0);
    }

    #[test]
    fn test_leaderboard_ignores_unknown_users_and_non_positive_spans() {
        let employees = vec![profile("a", "A")];
        let entries = vec![
            entry(1, "ghost", at(2026, 3, 2, 1, 0), Some(at(2026, 3, 2, 3, 0))),
            entry(2, "a", at(2026, 3, 2, 5, 0), Some(at(2026, 3, 2, 5, 0))),
            entry(3, "a", at(2026, 3, 2, 6, 0), None),
        ];
        let stats = bucket_by_employee(&entries, &employees, UTC, SortKey::Shifts, SortDirection::Asc);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].shifts, 0);
        assert_eq!(stats[0].days, 0);
        assert_eq!(stats[0].avg_hours, 0.0);
    }

    #[test]
    fn test_sort_by_name_and_ties_keep_input_order() {
        let employees = vec![profile("z", "Zed"), profile("x", "Anh"), profile("y", "Zed")];
        let by_name = bucket_by_employee(&[], &employees, UTC, SortKey::Name, SortDirection::Asc);
        let ids: Vec<&str> = by_name.iter().map(|s| s.profile.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "z", "y"]);

        let by_hours = bucket_by_employee(&[], &employees, UTC, SortKey::Hours, SortDirection::Desc);
        let ids: Vec<&str> = by_hours.iter().map(|s| s.profile.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_leaderboard_chart_labels_and_filters() {
        let mut nameless = profile("c-id", "");
        nameless.full_name = None;
        let employees = vec![profile("a", "Le Van An"), profile("b", "Pham Binh"), nameless];
        let entries = vec![
            entry(1, "a", at(2026, 3, 2, 1, 0), Some(at(2026, 3, 2, 2, 0))),
            entry(2, "c-id", at(2026, 3, 2, 1, 0), Some(at(2026, 3, 2, 4, 0))),
        ];
        let stats = bucket_by_employee(&entries, &employees, UTC, SortKey::Name, SortDirection::Asc);
        let bars = leaderboard_chart(&stats);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].label, "c-id");
        assert_eq!(bars[0].position, 1);
        assert_eq!(bars[1].label, "An");
    }

    #[test]
    fn test_format_duration_floors_minutes() {
        assert_eq!(format_duration(7.0), "7h 0m");
        assert_eq!(format_duration(1.999), "1h 59m");
        assert_eq!(format_duration(0.0), "0h 0m");
    }

    #[test]
    fn test_active_shift_and_elapsed() {
        let entries = vec![
            entry(1, "u", at(2026, 3, 2, 1, 0), Some(at(2026, 3, 2, 2, 0))),
            entry(2, "u", at(2026, 3, 2, 3, 0), None),
        ];
        let active = active_shift(&entries).unwrap();
        assert_eq!(active.id, 2);
        assert_eq!(elapsed_hours(active, at(2026, 3, 2, 4, 30)), 1.5);
    }
}
