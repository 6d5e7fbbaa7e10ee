//! Transient per-view state refreshed from the store.
//!
//! A failed fetch is logged and the previously loaded list is kept as-is.

use crate::store::Direction;
use crate::timesheet::aggregate::{
    EmployeeStat, SortDirection, SortKey, Summary, active_shift, bucket_by_employee, summarize,
};
use crate::timesheet::models::{DailyNote, EmployeeProfile, ShiftEntry};
use crate::timesheet::range::{DateRange, civil_date};
use crate::timesheet::repo::Timesheet;
use chrono::NaiveDate;
use chrono_tz::Tz;

/// One employee's shifts and notes for the selected range.
#[derive(Debug, Clone, Default)]
pub struct EmployeeView {
    pub user_id: String,
    pub entries: Vec<ShiftEntry>,
    pub notes: Vec<DailyNote>,
    pub active_shift: Option<ShiftEntry>,
}

impl EmployeeView {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    /// Fetch entries and notes in parallel. Returns `false` if either fetch failed.
    pub fn refresh(&mut self, ts: &Timesheet<'_>, range: &DateRange, tz: Tz) -> bool {
        let user_id = self.user_id.clone();

        let (entries, notes) = std::thread::scope(|s| {
            let notes = s.spawn(|| ts.notes_for_user(&user_id, range));
            let entries = ts.entries_for_user(&user_id, range, tz, Direction::Ascending);
            let notes = notes
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (entries, notes)
        });

        let mut ok = true;

        match entries {
            Ok(entries) => {
                self.active_shift = active_shift(&entries).cloned();
                self.entries = entries;
            }
            Err(e) => {
                log::error!("Error fetching time entries for {}: {}", self.user_id, e);
                ok = false;
            }
        }

        match notes {
            Ok(notes) => self.notes = notes,
            Err(e) => {
                log::error!("Error fetching daily notes for {}: {}", self.user_id, e);
                ok = false;
            }
        }

        ok
    }

    pub fn summary(&self, tz: Tz) -> Summary {
        summarize(&self.entries, tz)
    }

    /// Loaded entries whose start falls inside `range` (civil dates in `tz`).
    pub fn entries_in(&self, range: &DateRange, tz: Tz) -> Vec<ShiftEntry> {
        self.entries
            .iter()
            .filter(|e| range.contains(civil_date(e.start_time, tz)))
            .cloned()
            .collect()
    }

    pub fn note_on(&self, date: NaiveDate) -> Option<&DailyNote> {
        self.notes.iter().find(|n| n.date == date)
    }
}

/// All employees' shifts for the month containing the selected range.
#[derive(Debug, Clone, Default)]
pub struct OverallView {
    pub month: Option<DateRange>,
    pub entries: Vec<ShiftEntry>,
}

impl OverallView {
    pub fn refresh(&mut self, ts: &Timesheet<'_>, range: &DateRange, tz: Tz) -> bool {
        let month = range.month_of_start();
        match ts.entries_in_range(&month, tz) {
            Ok(entries) => {
                self.entries = entries;
                self.month = Some(month);
                true
            }
            Err(e) => {
                log::error!("Error fetching all entries: {}", e);
                false
            }
        }
    }

    pub fn summary(&self, tz: Tz) -> Summary {
        summarize(&self.entries, tz)
    }

    pub fn stats(
        &self,
        employees: &[EmployeeProfile],
        tz: Tz,
        key: SortKey,
        direction: SortDirection,
    ) -> Vec<EmployeeStat> {
        bucket_by_employee(&self.entries, employees, tz, key, direction)
    }
}
