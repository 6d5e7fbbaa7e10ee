pub mod admin;
pub mod config;
pub mod note;
pub mod profile;
pub mod shift;
pub mod summary;

use crate::config::Config;
use crate::store::rest::RestClient;
use crate::store::storage::StorageClient;
use crate::timesheet::models::EmployeeProfile;
use crate::timesheet::range::{DateRange, RangePreset, resolve};
use crate::timesheet::repo::Timesheet;
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Args, ValueEnum};
use serde::Serialize;

/// HTTP clients for the configured backend plus the signed-in user.
pub struct Backend {
    records: RestClient,
    blobs: StorageClient,
    pub user_id: String,
}

impl Backend {
    pub fn connect(config: &Config) -> Result<Self> {
        if config.store.url.is_empty() {
            anyhow::bail!("Store URL not set. Add url under [store] in ~/.shiftboard/config.toml");
        }
        let api_key = config.get_api_key()?;
        let user_id = config.user_id()?.to_string();

        let mut records = RestClient::new(&config.store.url, &api_key);
        let mut blobs = StorageClient::new(
            &config.store.url,
            &api_key,
            &config.store.attachments_bucket,
        );
        if let Some(token) = &config.store.access_token {
            records = records.with_access_token(token);
            blobs = blobs.with_access_token(token);
        }

        Ok(Self {
            records,
            blobs,
            user_id,
        })
    }

    pub fn timesheet(&self) -> Timesheet<'_> {
        Timesheet::new(&self.records, &self.blobs)
    }
}

/// Fail unless the signed-in user has the admin role.
pub fn require_admin(ts: &Timesheet<'_>, user_id: &str) -> Result<EmployeeProfile> {
    let profile = ts
        .profile(user_id)
        .context("Failed to load your profile")?
        .with_context(|| format!("No profile found for {}", user_id))?;

    if !profile.is_admin() {
        anyhow::bail!("This command is only available to admins");
    }
    Ok(profile)
}

/// Resolve whose data to show: yourself, or anyone when you are an admin.
pub fn target_user(ts: &Timesheet<'_>, self_id: &str, requested: Option<&str>) -> Result<String> {
    match requested {
        Some(other) if other != self_id => {
            require_admin(ts, self_id)?;
            Ok(other.to_string())
        }
        _ => Ok(self_id.to_string()),
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PresetArg {
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    #[arg(long, value_enum, help = "Named range (default: this month)")]
    pub preset: Option<PresetArg>,
    #[arg(long, help = "Calendar year, used with --month")]
    pub year: Option<i32>,
    #[arg(long, help = "Calendar month 1-12")]
    pub month: Option<u32>,
}

impl RangeArgs {
    pub fn preset(&self, today: NaiveDate) -> RangePreset {
        if let Some(month) = self.month {
            return RangePreset::Month {
                year: self.year.unwrap_or(today.year()),
                month,
            };
        }
        match self.preset {
            Some(PresetArg::ThisWeek) => RangePreset::ThisWeek,
            Some(PresetArg::LastWeek) => RangePreset::LastWeek,
            Some(PresetArg::LastMonth) => RangePreset::LastMonth,
            Some(PresetArg::ThisMonth) | None => RangePreset::ThisMonth,
        }
    }

    pub fn resolve(&self, today: NaiveDate) -> Result<(RangePreset, DateRange)> {
        let preset = self.preset(today);
        let range = resolve(preset, today)
            .with_context(|| format!("Invalid month: {}", preset.label()))?;
        Ok((preset, range))
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Last day inside a half-open range, for display.
pub fn last_day(range: &DateRange) -> NaiveDate {
    range.end.pred_opt().unwrap_or(range.end)
}
