//! Statutory holidays from a JSON feed of the form
//! `{"holidays": [{"observedDate": "2025-12-25", "provinces": [{"id": "BC"}]}]}`.

use crate::calendar::{DayOffReason, WorkDayCalendar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HolidayFeedError {
    #[error("failed to read holiday feed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed holiday feed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct HolidayFeed {
    #[serde(default)]
    holidays: Vec<FeedHoliday>,
}

#[derive(Debug, Deserialize)]
struct FeedHoliday {
    #[serde(rename = "observedDate")]
    observed_date: String,
    #[serde(default)]
    provinces: Vec<FeedProvince>,
}

#[derive(Debug, Deserialize)]
struct FeedProvince {
    id: String,
}

/// Observed dates for `province` (matched case-insensitively), sorted and deduplicated.
pub fn parse_holiday_feed(json: &str, province: &str) -> Result<Vec<NaiveDate>, HolidayFeedError> {
    let feed: HolidayFeed = serde_json::from_str(json)?;
    let mut dates: Vec<NaiveDate> = feed
        .holidays
        .iter()
        .filter(|holiday| {
            holiday
                .provinces
                .iter()
                .any(|p| p.id.eq_ignore_ascii_case(province))
        })
        .filter_map(|holiday| {
            match NaiveDate::parse_from_str(holiday.observed_date.trim(), "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(err) => {
                    tracing::warn!(
                        observed_date = %holiday.observed_date,
                        error = %err,
                        "skipping holiday with unparseable date"
                    );
                    None
                }
            }
        })
        .collect();
    dates.sort();
    dates.dedup();
    Ok(dates)
}

/// Mark every holiday of `province` in the feed on `calendar`; returns how many dates were new.
pub fn import_holiday_feed(
    calendar: &mut WorkDayCalendar,
    json: &str,
    province: &str,
) -> Result<usize, HolidayFeedError> {
    let dates = parse_holiday_feed(json, province)?;
    let mut added = 0;
    for date in dates {
        if calendar.day_off_reason(date) != Some(DayOffReason::Holiday) {
            calendar.add_holiday(date);
            added += 1;
        }
    }
    tracing::info!(province, added, "imported holidays");
    Ok(added)
}

pub fn import_holiday_file(
    calendar: &mut WorkDayCalendar,
    path: impl AsRef<Path>,
    province: &str,
) -> Result<usize, HolidayFeedError> {
    let json = fs::read_to_string(path)?;
    import_holiday_feed(calendar, &json, province)
}
