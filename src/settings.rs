//! Display context passed explicitly to every command.

use crate::OutputFormat;
use crate::config::Config;
use crate::timesheet::range::today_in;
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy)]
pub struct Settings {
    /// Civil timezone every date is interpreted in
    pub timezone: Tz,
    pub format: OutputFormat,
}

impl Settings {
    pub fn from_config(config: &Config, format: OutputFormat) -> Result<Self> {
        Ok(Self {
            timezone: config.display.tz()?,
            format,
        })
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        today_in(self.timezone, now)
    }

    /// Render an instant as civil wall time, e.g. `2026-03-02 09:00`.
    pub fn local(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.timezone)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_ho_chi_minh() {
        let settings = Settings::from_config(&Config::default(), OutputFormat::Text).unwrap();
        assert_eq!(settings.timezone, chrono_tz::Asia::Ho_Chi_Minh);

        let late_utc: DateTime<Utc> = "2026-03-01T18:30:00Z".parse().unwrap();
        assert_eq!(settings.today(late_utc).to_string(), "2026-03-02");
        assert_eq!(settings.local(late_utc), "2026-03-02 01:30");
    }

    #[test]
    fn test_rejects_unknown_timezone() {
        let mut config = Config::default();
        config.display.timezone = "Mars/Olympus".to_string();
        assert!(Settings::from_config(&config, OutputFormat::Json).is_err());
    }
}
