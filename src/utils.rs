use chrono::{Datelike, NaiveDate, NaiveTime};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

use crate::models::{DATE_FORMAT, TIME_FORMAT};

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(&self) -> &'static str {
        match self {
            Profile::Dev => "dayplan-dev",
            Profile::Prod => "dayplan",
        }
    }
}

/// Get the configuration directory path
/// If profile is Dev, uses "dayplan-dev" instead of "dayplan"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "dayplan", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "dayplan", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT)
}

/// Parse a 24-hour time of day (HH:MM)
pub fn parse_time(time_str: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(time_str.trim(), TIME_FORMAT)
}

/// Parse a month (YYYY-MM) into its first day
pub fn parse_month(month_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(&format!("{}-01", month_str.trim()), DATE_FORMAT)
}

/// Every calendar day of the month containing `day`
pub fn days_of_month(day: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let (year, month) = (day.year(), day.month());
    (1..=31).filter_map(move |d| NaiveDate::from_ymd_opt(year, month, d))
}

/// Get the current local date
pub fn get_current_date() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Normalize raw lead-minute input: negative or non-numeric becomes 0
pub fn normalize_alarm_before(raw: &str) -> u32 {
    raw.trim()
        .parse::<i64>()
        .map(|minutes| minutes.clamp(0, i64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}
