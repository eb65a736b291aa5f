//! TOML configuration for capacity, forecasting and the work calendar.
//!
//! Every section and field is optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [capacity]
//! end_of_day = "16:00"
//! today_ceiling_minutes = 420
//! future_day_minutes = 360
//!
//! [forecast]
//! asap = "exclude"
//! weeks = 4    # 1 to 520
//!
//! [calendar]
//! working_days = ["Mon", "Tue", "Wed", "Thu", "Fri"]
//! holidays = ["2025-12-25"]
//! ```

use crate::calendar::{CalendarError, WorkDayCalendar};
use crate::capacity::DailyCapacityPolicy;
use crate::forecast::AsapPolicy;
use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid end_of_day '{0}' (expected HH:MM)")]
    EndOfDay(String),
    #[error("{field} must be a finite, non-negative number of minutes (got {value})")]
    Capacity { field: &'static str, value: f64 },
    #[error("forecast weeks must be between 1 and {max} (got {value})")]
    Weeks { value: u32, max: u32 },
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorklistConfig {
    #[serde(default)]
    pub capacity: CapacitySettings,
    #[serde(default)]
    pub forecast: ForecastSettings,
    #[serde(default)]
    pub calendar: CalendarSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacitySettings {
    pub end_of_day: String,
    pub today_ceiling_minutes: f64,
    pub future_day_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub asap: AsapPolicy,
    pub weeks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    pub working_days: Vec<Weekday>,
    pub holidays: Vec<NaiveDate>,
}

impl Default for CapacitySettings {
    fn default() -> Self {
        Self {
            end_of_day: format!("{:02}:00", DailyCapacityPolicy::DEFAULT_END_OF_DAY_HOUR),
            today_ceiling_minutes: DailyCapacityPolicy::DEFAULT_TODAY_CEILING_MINUTES,
            future_day_minutes: DailyCapacityPolicy::DEFAULT_FUTURE_DAY_MINUTES,
        }
    }
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            asap: AsapPolicy::default(),
            weeks: 4,
        }
    }
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            holidays: Vec::new(),
        }
    }
}

impl CapacitySettings {
    pub fn policy(&self) -> Result<DailyCapacityPolicy, ConfigError> {
        let end_of_day = NaiveTime::parse_from_str(self.end_of_day.trim(), "%H:%M")
            .map_err(|_| ConfigError::EndOfDay(self.end_of_day.clone()))?;
        let today = check_minutes("today_ceiling_minutes", self.today_ceiling_minutes)?;
        let future = check_minutes("future_day_minutes", self.future_day_minutes)?;
        Ok(DailyCapacityPolicy::new(end_of_day, today, future))
    }
}

fn check_minutes(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Capacity { field, value })
    }
}

impl ForecastSettings {
    /// Ten years of weekly rows.
    pub const MAX_WEEKS: u32 = 520;

    pub fn weeks(&self) -> Result<u32, ConfigError> {
        if (1..=Self::MAX_WEEKS).contains(&self.weeks) {
            Ok(self.weeks)
        } else {
            Err(ConfigError::Weeks {
                value: self.weeks,
                max: Self::MAX_WEEKS,
            })
        }
    }
}

impl CalendarSettings {
    pub fn calendar(&self) -> Result<WorkDayCalendar, ConfigError> {
        let mut calendar = WorkDayCalendar::default();
        calendar.set_working_days(&self.working_days)?;
        calendar.add_holidays(&self.holidays);
        Ok(calendar)
    }
}

impl WorklistConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Like [`WorklistConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capacity.policy()?;
        self.forecast.weeks()?;
        self.calendar.calendar()?;
        Ok(())
    }
}
