use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TIME_ENTRIES: &str = "time_entries";
pub const DAILY_NOTES: &str = "daily_notes";
pub const PROFILES: &str = "profiles";

/// One shift; `end_time == None` means the shift is still open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftEntry {
    pub id: i64,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ShiftEntry {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Insert/update payload for a shift. `id` is `None` for new rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftDraft {
    #[serde(skip)]
    pub id: Option<i64>,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNote {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Employee => write!(f, "employee"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role '{}', expected admin or employee", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EmployeeProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Full name, or the id when the profile has no name yet.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_open_shift() {
        let entry: ShiftEntry = serde_json::from_value(json!({
            "id": 12,
            "user_id": "4b1c",
            "start_time": "2026-03-02T01:30:00+00:00",
            "end_time": null,
            "created_at": "2026-03-02T01:30:00.512+00:00"
        }))
        .unwrap();

        assert_eq!(entry.id, 12);
        assert!(entry.is_open());
    }

    #[test]
    fn test_draft_omits_id() {
        let draft = ShiftDraft {
            id: Some(5),
            user_id: "u".to_string(),
            start_time: "2026-03-02T01:30:00Z".parse().unwrap(),
            end_time: None,
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert!(json.get("id").is_none());
        assert!(json["end_time"].is_null());
    }

    #[test]
    fn test_deserialize_note_and_profile() {
        let note: DailyNote = serde_json::from_value(json!({
            "id": 3,
            "user_id": "u",
            "date": "2026-03-02",
            "note": "Shipped the release",
            "file_url": null
        }))
        .unwrap();
        assert_eq!(note.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());

        let profile: EmployeeProfile = serde_json::from_value(json!({
            "id": "u",
            "full_name": "Nguyen Van An",
            "avatar_url": null,
            "role": "admin"
        }))
        .unwrap();
        assert!(profile.is_admin());
        assert_eq!(profile.display_name(), "Nguyen Van An");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("manager".parse::<Role>().is_err());
    }
}
