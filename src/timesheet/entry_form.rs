use crate::timesheet::models::ShiftDraft;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

pub const DEFAULT_START: &str = "09:00";
pub const DEFAULT_END: &str = "17:00";

/// Raw manual-entry input: a civil date plus wall-clock start/end times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    pub date: String,
    pub start: String,
    pub end: Option<String>,
}

impl EntryForm {
    /// Blank form for a new entry: today, 09:00 to 17:00.
    pub fn new_for(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            start: DEFAULT_START.to_string(),
            end: Some(DEFAULT_END.to_string()),
        }
    }

    /// Form pre-filled from an existing entry, rendered in `tz`.
    pub fn from_entry(start: DateTime<Utc>, end: Option<DateTime<Utc>>, tz: Tz) -> Self {
        let local_start = start.with_timezone(&tz);
        Self {
            date: local_start.format("%Y-%m-%d").to_string(),
            start: local_start.format("%H:%M").to_string(),
            end: end.map(|e| e.with_timezone(&tz).format("%H:%M").to_string()),
        }
    }

    /// `None` when the date or start is missing or malformed; the caller skips
    /// submission. An unparsable end time yields an open entry. An end earlier
    /// than the start belongs to the next day (overnight shift).
    pub fn to_draft(&self, user_id: &str, id: Option<i64>, tz: Tz) -> Option<ShiftDraft> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()?;
        let start = parse_wall_time(&self.start)?;
        let start_time = to_utc(date, start, tz)?;

        let end_time = self
            .end
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .and_then(parse_wall_time)
            .and_then(|t| {
                if t < start {
                    log::debug!("End {} before start {}, rolling to next day", t, start);
                    to_utc(date.succ_opt()?, t, tz)
                } else {
                    to_utc(date, t, tz)
                }
            });

        Some(ShiftDraft {
            id,
            user_id: user_id.to_string(),
            start_time,
            end_time,
        })
    }
}

fn parse_wall_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

fn to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
