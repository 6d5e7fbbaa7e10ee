use crate::store::{BlobStore, Direction, Query, RecordStore, StoreResult};
use crate::timesheet::models::{
    DAILY_NOTES, DailyNote, EmployeeProfile, PROFILES, ShiftDraft, ShiftEntry, TIME_ENTRIES,
};
use crate::timesheet::range::DateRange;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// A file to attach to a daily note.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Typed timesheet operations over an injected record store and blob store.
pub struct Timesheet<'a> {
    records: &'a dyn RecordStore,
    blobs: &'a dyn BlobStore,
}

fn instant(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn decode<T: DeserializeOwned>(rows: Vec<Value>) -> StoreResult<Vec<T>> {
    rows.into_iter()
        .map(|r| serde_json::from_value(r).map_err(Into::into))
        .collect()
}

fn decode_one<T: DeserializeOwned>(row: Value) -> StoreResult<T> {
    Ok(serde_json::from_value(row)?)
}

/// Blob key for a note attachment: `{user_id}/{date}/{timestamp_ms}-{filename}`.
pub fn attachment_path(user_id: &str, date: NaiveDate, now: DateTime<Utc>, file_name: &str) -> String {
    format!(
        "{}/{}/{}-{}",
        user_id,
        date.format("%Y-%m-%d"),
        now.timestamp_millis(),
        file_name
    )
}

impl<'a> Timesheet<'a> {
    pub fn new(records: &'a dyn RecordStore, blobs: &'a dyn BlobStore) -> Self {
        Self { records, blobs }
    }

    /// One user's shifts starting inside `range`, ordered by start time.
    pub fn entries_for_user(
        &self,
        user_id: &str,
        range: &DateRange,
        tz: Tz,
        direction: Direction,
    ) -> StoreResult<Vec<ShiftEntry>> {
        let (start, end) = range.utc_bounds(tz);
        let query = Query::new()
            .eq("user_id", user_id)
            .gte("start_time", instant(start))
            .lt("start_time", instant(end))
            .order("start_time", direction);

        decode(self.records.select(TIME_ENTRIES, &query)?)
    }

    /// Every user's shifts starting inside `range`.
    pub fn entries_in_range(&self, range: &DateRange, tz: Tz) -> StoreResult<Vec<ShiftEntry>> {
        let (start, end) = range.utc_bounds(tz);
        let query = Query::new()
            .gte("start_time", instant(start))
            .lt("start_time", instant(end));

        decode(self.records.select(TIME_ENTRIES, &query)?)
    }

    pub fn entry(&self, id: i64) -> StoreResult<Option<ShiftEntry>> {
        let query = Query::new().eq("id", id).limit(1);
        Ok(decode(self.records.select(TIME_ENTRIES, &query)?)?
            .into_iter()
            .next())
    }

    /// The user's most recent shift without an end time.
    pub fn open_shift(&self, user_id: &str) -> StoreResult<Option<ShiftEntry>> {
        let query = Query::new()
            .eq("user_id", user_id)
            .is_null("end_time")
            .order("start_time", Direction::Descending)
            .limit(1);

        Ok(decode(self.records.select(TIME_ENTRIES, &query)?)?
            .into_iter()
            .next())
    }

    pub fn start_shift(&self, user_id: &str, now: DateTime<Utc>) -> StoreResult<ShiftEntry> {
        let row = json!({
            "user_id": user_id,
            "start_time": instant(now),
            "end_time": null,
        });
        decode_one(self.records.insert(TIME_ENTRIES, &row)?)
    }

    pub fn end_shift(&self, id: i64, now: DateTime<Utc>) -> StoreResult<ShiftEntry> {
        let patch = json!({ "end_time": instant(now) });
        decode_one(self.records.update(TIME_ENTRIES, &id.to_string(), &patch)?)
    }

    /// Insert a new shift, or update it in place when the draft carries an id.
    pub fn save_entry(&self, draft: &ShiftDraft) -> StoreResult<ShiftEntry> {
        let row = serde_json::to_value(draft)?;
        let saved = match draft.id {
            Some(id) => self.records.update(TIME_ENTRIES, &id.to_string(), &row)?,
            None => self.records.insert(TIME_ENTRIES, &row)?,
        };
        decode_one(saved)
    }

    pub fn delete_entry(&self, id: i64) -> StoreResult<()> {
        self.records.delete(TIME_ENTRIES, &id.to_string())
    }

    /// Notes dated inside `range` for one user.
    pub fn notes_for_user(&self, user_id: &str, range: &DateRange) -> StoreResult<Vec<DailyNote>> {
        let query = Query::new()
            .eq("user_id", user_id)
            .gte("date", range.start.format("%Y-%m-%d"))
            .lt("date", range.end.format("%Y-%m-%d"))
            .order("date", Direction::Ascending);

        decode(self.records.select(DAILY_NOTES, &query)?)
    }

    pub fn note_for_day(&self, user_id: &str, date: NaiveDate) -> StoreResult<Option<DailyNote>> {
        let query = Query::new()
            .eq("user_id", user_id)
            .eq("date", date.format("%Y-%m-%d"))
            .limit(1);

        Ok(decode(self.records.select(DAILY_NOTES, &query)?)?
            .into_iter()
            .next())
    }

    /// Upsert the note for `(user_id, date)`.
    ///
    /// The previous attachment is dropped when it is replaced or explicitly
    /// removed; failing to delete the old object does not stop the save. A
    /// failed upload aborts before the note row is touched.
    #[allow(clippy::too_many_arguments)]
    pub fn save_note(
        &self,
        user_id: &str,
        date: NaiveDate,
        text: &str,
        attachment: Option<Attachment>,
        remove_existing: bool,
        existing: Option<&DailyNote>,
        now: DateTime<Utc>,
    ) -> StoreResult<DailyNote> {
        let mut file_url = existing.and_then(|n| n.file_url.clone());

        if remove_existing || attachment.is_some() {
            if let Some(old_url) = file_url.take() {
                self.remove_attachment(&old_url);
            }
        }

        if let Some(file) = attachment {
            let path = attachment_path(user_id, date, now, &file.file_name);
            self.blobs.upload(&path, file.bytes, &file.content_type)?;
            file_url = Some(self.blobs.public_url(&path));
        }

        let row = json!({
            "user_id": user_id,
            "date": date.format("%Y-%m-%d").to_string(),
            "note": text,
            "file_url": file_url,
        });

        decode_one(self.records.upsert(DAILY_NOTES, &row, &["user_id", "date"])?)
    }

    /// Delete a note, removing its attachment first on a best-effort basis.
    pub fn delete_note(&self, note: &DailyNote) -> StoreResult<()> {
        if let Some(url) = &note.file_url {
            self.remove_attachment(url);
        }
        self.records.delete(DAILY_NOTES, &note.id.to_string())
    }

    fn remove_attachment(&self, url: &str) {
        let Some(path) = self.blobs.path_from_url(url) else {
            log::warn!("Attachment URL {} is outside the attachment store, leaving it", url);
            return;
        };
        if let Err(e) = self.blobs.remove(&[path]) {
            log::warn!("Could not remove attachment {}: {}", url, e);
        }
    }

    /// Single-row profile lookup; a missing row is `Ok(None)` (no profile yet).
    pub fn profile(&self, user_id: &str) -> StoreResult<Option<EmployeeProfile>> {
        let query = Query::new().eq("id", user_id).limit(1);
        Ok(decode(self.records.select(PROFILES, &query)?)?
            .into_iter()
            .next())
    }

    pub fn profiles(&self) -> StoreResult<Vec<EmployeeProfile>> {
        let query = Query::new().order("full_name", Direction::Ascending);
        decode(self.records.select(PROFILES, &query)?)
    }

    pub fn update_profile(&self, profile: &EmployeeProfile) -> StoreResult<EmployeeProfile> {
        let patch = json!({
            "full_name": profile.full_name,
            "avatar_url": profile.avatar_url,
            "role": profile.role,
        });
        decode_one(self.records.update(PROFILES, &profile.id, &patch)?)
    }
}
