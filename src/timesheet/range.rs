//! Named date-range presets resolved to half-open civil-date ranges.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePreset {
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    Month { year: i32, month: u32 },
}

impl RangePreset {
    pub fn label(&self) -> String {
        match self {
            RangePreset::ThisWeek => "This week".to_string(),
            RangePreset::LastWeek => "Last week".to_string(),
            RangePreset::ThisMonth => "This month".to_string(),
            RangePreset::LastMonth => "Last month".to_string(),
            RangePreset::Month { year, month } => match first_of_month(*year, *month) {
                Some(d) => d.format("%B %Y").to_string(),
                None => format!("{}-{:02}", year, month),
            },
        }
    }
}

/// Civil dates `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Civil midnights of both ends as UTC instants, for `start_time` filters.
    pub fn utc_bounds(&self, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        (civil_midnight(self.start, tz), civil_midnight(self.end, tz))
    }

    /// The whole calendar month containing `start`.
    pub fn month_of_start(&self) -> DateRange {
        let first = self.start.with_day(1).unwrap_or(self.start);
        DateRange {
            start: first,
            end: next_month(first),
        }
    }
}

/// Resolve a preset relative to `today`. `None` only for an invalid explicit month.
pub fn resolve(preset: RangePreset, today: NaiveDate) -> Option<DateRange> {
    match preset {
        RangePreset::ThisWeek => {
            let start = start_of_week(today);
            Some(DateRange {
                start,
                end: start + Duration::days(7),
            })
        }
        RangePreset::LastWeek => {
            let start = start_of_week(today) - Duration::days(7);
            Some(DateRange {
                start,
                end: start + Duration::days(7),
            })
        }
        RangePreset::ThisMonth => month_range(today.year(), today.month()),
        RangePreset::LastMonth => {
            let (year, month) = if today.month() == 1 {
                (today.year() - 1, 12)
            } else {
                (today.year(), today.month() - 1)
            };
            month_range(year, month)
        }
        RangePreset::Month { year, month } => month_range(year, month),
    }
}

/// Monday of the week containing `date`; a Sunday maps six days back.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn next_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

pub fn month_range(year: i32, month: u32) -> Option<DateRange> {
    let start = first_of_month(year, month)?;
    Some(DateRange {
        start,
        end: next_month(start),
    })
}

/// Days in the month, 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    month_range(year, month)
        .map(|r| r.num_days() as u32)
        .unwrap_or(0)
}

/// Civil date of an instant in `tz`.
pub fn civil_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    civil_date(now, tz)
}

/// Start of the civil day. When a DST jump skips midnight the day starts at
/// the first wall-clock minute that exists.
fn civil_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    (0..24 * 60)
        .find_map(|m| {
            tz.from_local_datetime(&(naive + Duration::minutes(m)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}
